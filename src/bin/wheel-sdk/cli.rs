//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use wheel_sdk::core::RuntimeVersion;

/// wheel-sdk - resolve and configure VTK wheel SDK builds
#[derive(Parser)]
#[command(name = "wheel-sdk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Source directory of the module to build (defaults to current directory)
    #[arg(long, global = true, env = "WHEEL_SDK_PROJECT_DIR")]
    pub project_dir: Option<PathBuf>,

    /// Fail instead of downloading anything
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the platform key and SDK artifact for a platform
    Platform(PlatformArgs),

    /// Download the SDK and VTKExternalModule into the cache
    Fetch(FetchArgs),

    /// Print the CMake arguments for the module build
    Args(ArgsArgs),

    /// Resolve dependencies and build the module with CMake
    Build(BuildArgs),

    /// Remove the dependency cache
    Clean(CleanArgs),
}

#[derive(Args)]
pub struct PlatformArgs {
    /// Operating system (defaults to the host)
    #[arg(long)]
    pub os: Option<String>,

    /// CPU architecture (defaults to the host)
    #[arg(long)]
    pub arch: Option<String>,

    /// Python version, e.g. 3.10
    #[arg(long)]
    pub python_version: Option<RuntimeVersion>,

    /// SDK version
    #[arg(long)]
    pub sdk_version: Option<String>,
}

#[derive(Args)]
pub struct FetchArgs {
    /// Python version, e.g. 3.10
    #[arg(long)]
    pub python_version: Option<RuntimeVersion>,
}

#[derive(Args)]
pub struct ArgsArgs {
    /// Python version, e.g. 3.10
    #[arg(long)]
    pub python_version: Option<RuntimeVersion>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Python version, e.g. 3.10
    #[arg(long)]
    pub python_version: Option<RuntimeVersion>,

    /// CMake binary directory (defaults to `build` in the project)
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// CMAKE_BUILD_TYPE
    #[arg(long)]
    pub build_type: Option<String>,

    /// Install the built module into this prefix
    #[arg(long)]
    pub install_prefix: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {}
