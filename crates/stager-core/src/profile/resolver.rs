//! Selector + arguments + context -> [`PlatformProfile`].

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{Platform, PlatformProfile};
use crate::catalog::{Category, CategorySet};
use crate::context::{ENV_RESOURCES_FOLDER, ENV_SOURCE_ROOT, ENV_TARGET_BUILD_DIR, StageContext};
use crate::error::{Result, StageError};
use crate::extras::{BuildConfig, ExtrasSource, WINDOWS_SUBDIRS};

pub const TEXTURE_SUFFIX_DESKTOP: &str = ".dds";
pub const TEXTURE_SUFFIX_ANDROID: &str = ".ktx";
pub const TEXTURE_SUFFIX_IOS: &str = ".pvr";

/// Categories a headless server still needs.
pub fn server_categories() -> CategorySet {
    CategorySet::only(&[Category::Scripts, Category::Json, Category::CollideModels])
}

/// Categories of a desktop client; the interpreter library comes from elsewhere.
pub fn desktop_categories() -> CategorySet {
    CategorySet::all().without(Category::PythonLibrary)
}

/// Categories enabled by one mobile sub-flag.
pub fn mobile_flag_categories(flag: &str) -> Option<CategorySet> {
    let set = match flag {
        "full" => CategorySet::all(),
        "python" => CategorySet::only(&[Category::PythonLibrary]),
        "textures" => CategorySet::only(&[Category::Textures]),
        "fonts" => CategorySet::only(&[Category::Fonts]),
        "scripts" => CategorySet::only(&[Category::Scripts]),
        "models" => CategorySet::only(&[Category::Models, Category::CollideModels]),
        "audio" => CategorySet::only(&[Category::Audio]),
        "json" => CategorySet::only(&[Category::Json]),
        _ => return None,
    };
    Some(set)
}

/// Resolve a platform profile.
///
/// `args` are the tokens after the selector. Relative destination paths are
/// taken relative to the context's project root.
pub fn resolve(selector: &str, args: &[String], ctx: &StageContext) -> Result<PlatformProfile> {
    let platform: Platform = selector
        .parse()
        .map_err(|()| StageError::UnknownPlatform {
            selector: selector.to_string(),
        })?;
    let parsed = ParsedArgs::split(platform, args);

    let profile = match platform {
        Platform::Android => resolve_android(platform, parsed, ctx)?,
        Platform::Cmake | Platform::CmakeServer => {
            parsed.reject_flags()?;
            let [dst] = parsed.positionals(["dst"])?;
            PlatformProfile {
                platform,
                source_root: ctx.assets_root(),
                destination_root: absolutize(ctx.project_root(), dst),
                categories: if platform.is_server() {
                    server_categories()
                } else {
                    desktop_categories()
                },
                texture_suffix: (!platform.is_server()).then(|| TEXTURE_SUFFIX_DESKTOP.to_string()),
                extras: None,
                wants_manifest: false,
                manifest_is_full: false,
            }
        }
        Platform::Windows(arch) | Platform::WindowsServer(arch) => {
            parsed.reject_flags()?;
            let [config, dst] = parsed.positionals(["build-config", "dst"])?;
            let build = BuildConfig::parse(config).ok_or_else(|| StageError::InvalidArgument {
                selector: platform.selector().to_string(),
                argument: "build-config",
                value: config.to_string(),
            })?;
            PlatformProfile {
                platform,
                source_root: ctx.assets_root(),
                destination_root: absolutize(ctx.project_root(), dst),
                categories: if platform.is_server() {
                    server_categories()
                } else {
                    desktop_categories()
                },
                texture_suffix: (!platform.is_server()).then(|| TEXTURE_SUFFIX_DESKTOP.to_string()),
                extras: Some(ExtrasSource {
                    root: ctx.extras_root().join("windows").join(arch.as_str()),
                    subdirs: WINDOWS_SUBDIRS.iter().map(|s| s.to_string()).collect(),
                    require_compiled: build.requires_compiled(),
                }),
                wants_manifest: false,
                manifest_is_full: false,
            }
        }
        Platform::XcodeMac | Platform::XcodeIos => {
            parsed.reject_flags()?;
            parsed.positionals([])?;
            resolve_xcode(platform, ctx)?
        }
    };

    debug!(
        platform = %profile.platform,
        source = %profile.source_root.display(),
        destination = %profile.destination_root.display(),
        categories = %profile.categories,
        manifest = profile.wants_manifest,
        "resolved platform profile"
    );
    Ok(profile)
}

fn resolve_android(
    platform: Platform,
    parsed: ParsedArgs<'_>,
    ctx: &StageContext,
) -> Result<PlatformProfile> {
    let mut categories = CategorySet::empty();
    let mut full = false;
    for flag in &parsed.flags {
        let name = flag.trim_start_matches('-');
        let set = mobile_flag_categories(name).ok_or_else(|| StageError::UnknownFlag {
            selector: platform.selector().to_string(),
            flag: flag.to_string(),
        })?;
        full |= name == "full";
        for category in set.iter() {
            categories.insert(category);
        }
    }
    let [dst] = parsed.positionals(["dst"])?;

    if categories.is_empty() {
        warn!("no asset categories enabled; staging a stripped payload");
    }

    Ok(PlatformProfile {
        platform,
        source_root: ctx.assets_root(),
        destination_root: absolutize(ctx.project_root(), dst),
        categories,
        texture_suffix: Some(TEXTURE_SUFFIX_ANDROID.to_string()),
        extras: None,
        wants_manifest: true,
        manifest_is_full: full,
    })
}

fn resolve_xcode(platform: Platform, ctx: &StageContext) -> Result<PlatformProfile> {
    let require = |variable: &'static str| {
        ctx.var(variable)
            .ok_or_else(|| StageError::MissingEnvironmentContext {
                selector: platform.selector().to_string(),
                variable,
            })
    };
    let source_root = PathBuf::from(require(ENV_SOURCE_ROOT)?);
    let build_dir = PathBuf::from(require(ENV_TARGET_BUILD_DIR)?);
    let resources = require(ENV_RESOURCES_FOLDER)?;

    // The Xcode project sits one directory below the project root.
    let project_root = source_root.parent().unwrap_or(&source_root);

    let (categories, suffix) = match platform {
        Platform::XcodeIos => (CategorySet::all(), TEXTURE_SUFFIX_IOS),
        _ => (desktop_categories(), TEXTURE_SUFFIX_DESKTOP),
    };

    Ok(PlatformProfile {
        platform,
        source_root: ctx.assets_root_for(project_root),
        destination_root: build_dir.join(resources),
        categories,
        texture_suffix: Some(suffix.to_string()),
        extras: None,
        wants_manifest: false,
        manifest_is_full: false,
    })
}

fn absolutize(project_root: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

/// Arguments split into dash-prefixed flags and positionals.
struct ParsedArgs<'a> {
    platform: Platform,
    flags: Vec<&'a str>,
    positionals: Vec<&'a str>,
}

impl<'a> ParsedArgs<'a> {
    fn split(platform: Platform, args: &'a [String]) -> Self {
        let (flags, positionals) = args
            .iter()
            .map(String::as_str)
            .partition(|a| a.starts_with('-') && a.len() > 1);
        Self {
            platform,
            flags,
            positionals,
        }
    }

    fn reject_flags(&self) -> Result<()> {
        match self.flags.first() {
            Some(flag) => Err(StageError::UnknownFlag {
                selector: self.platform.selector().to_string(),
                flag: flag.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Exactly `N` positionals, named for error messages.
    fn positionals<const N: usize>(&self, names: [&'static str; N]) -> Result<[&'a str; N]> {
        if let Some(missing) = names.get(self.positionals.len()) {
            return Err(StageError::MissingArgument {
                selector: self.platform.selector().to_string(),
                argument: *missing,
            });
        }
        if let Some(extra) = self.positionals.get(N) {
            return Err(StageError::UnexpectedArgument {
                selector: self.platform.selector().to_string(),
                argument: extra.to_string(),
            });
        }
        let mut out = [""; N];
        out.copy_from_slice(&self.positionals);
        Ok(out)
    }
}
