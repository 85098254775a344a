//! Built-in detector catalog.

mod dotnet;
mod dotnet_framework;
mod mvvm_toolkit;
mod win_forms;
mod winui;
mod wpf;

pub use dotnet::DotNetDetector;
pub use dotnet_framework::{DotNetFrameworkDetector, DOTNET_FRAMEWORK_PRODUCT};
pub use mvvm_toolkit::MvvmToolkitDetector;
pub use win_forms::WinFormsDetector;
pub use winui::WinUiDetector;
pub use wpf::WpfDetector;
