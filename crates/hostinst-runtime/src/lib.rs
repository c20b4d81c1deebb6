mod dotnet;
mod error;
mod inventory;
mod traits;

pub use dotnet::DotnetHost;
pub use error::HostError;
pub use inventory::{ASPNETCORE_RUNTIME, InstalledRuntime, newly_installed, parse_runtime_list};
pub use traits::{InstallerStatus, RuntimeHost, RuntimeListing};
