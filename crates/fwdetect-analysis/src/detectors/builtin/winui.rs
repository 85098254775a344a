use crate::detectors::builder::DetectorBuilder;
use crate::detectors::traits::{Detector, DetectorCategory, DetectorInfo};

/// WinUI 3 from the Windows App SDK.
pub struct WinUiDetector;

impl Detector for WinUiDetector {
    fn info(&self) -> DetectorInfo {
        DetectorInfo::new("WinUIDetector", "WinUI", DetectorCategory::Framework)
            .with_description("WinUI 3")
    }

    fn define<'r>(&self, builder: DetectorBuilder<'r>) -> DetectorBuilder<'r> {
        builder
            .required_any_of("Microsoft.UI.Xaml", |alts| {
                alts.alternative("Loaded Xaml", |checks| {
                    checks.contains_loaded_module("Microsoft.UI.Xaml.dll")
                })
                .alternative("Packaged WinUI", |checks| {
                    checks.contains_module("Microsoft.WinUI.dll")
                })
            })
            .optional("WinUI Window", |checks| {
                checks.contains_active_window("WinUIDesktopWin32WindowClass")
            })
    }
}
