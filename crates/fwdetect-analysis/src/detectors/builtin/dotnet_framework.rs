use crate::checks::ModuleArgs;
use crate::detectors::builder::DetectorBuilder;
use crate::detectors::traits::{Detector, DetectorCategory, DetectorInfo};

/// Product name stamped on .NET Framework runtime binaries.
pub const DOTNET_FRAMEWORK_PRODUCT: &str = "Microsoft® .NET Framework";

/// Microsoft .NET Framework (desktop CLR).
pub struct DotNetFrameworkDetector;

fn framework_module(file_name: &str) -> ModuleArgs {
    ModuleArgs::new(file_name).with_product_name(DOTNET_FRAMEWORK_PRODUCT)
}

impl Detector for DotNetFrameworkDetector {
    fn info(&self) -> DetectorInfo {
        DetectorInfo::new(
            "DotNetFrameworkDetector",
            "DotNetFramework",
            DetectorCategory::Framework,
        )
        .with_description("Microsoft .NET Framework")
    }

    fn define<'r>(&self, builder: DetectorBuilder<'r>) -> DetectorBuilder<'r> {
        builder
            .required_any_of("Runtime", |alts| {
                alts.alternative("CLR Module", |checks| {
                    checks.contains_loaded_module_with(framework_module("clr.dll"))
                })
                .alternative("mscorlib Module", |checks| {
                    checks.contains_loaded_module_with(framework_module("mscorlib.dll").with_ngen())
                })
            })
            .optional("Extra Modules", |checks| {
                checks
                    .contains_loaded_module_with(framework_module("clrjit.dll"))
                    .contains_loaded_module_with(framework_module("mscorjit.dll"))
            })
    }
}
