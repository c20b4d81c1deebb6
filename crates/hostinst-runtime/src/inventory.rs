/// Shared framework name of the ASP.NET Core runtime.
pub const ASPNETCORE_RUNTIME: &str = "Microsoft.AspNetCore.App";

/// One line of `dotnet --list-runtimes` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledRuntime {
    pub name: String,
    pub version: String,
    pub location: Option<String>,
}

impl InstalledRuntime {
    #[must_use]
    pub fn is(&self, name: &str, version: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) && self.version == version
    }
}

/// Parse lines shaped like `Microsoft.AspNetCore.App 9.0.3 [C:\Program Files\dotnet\shared\Microsoft.AspNetCore.App]`.
/// Lines that do not carry at least a name and a version are ignored.
#[must_use]
pub fn parse_runtime_list(output: &str) -> Vec<InstalledRuntime> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let (name, rest) = line.split_once(char::is_whitespace)?;
            let rest = rest.trim_start();
            let (version, location) = match rest.split_once(char::is_whitespace) {
                Some((version, location)) => (version, Some(location)),
                None => (rest, None),
            };
            if version.is_empty() {
                return None;
            }

            let location = location
                .map(|raw| raw.trim().trim_start_matches('[').trim_end_matches(']'))
                .filter(|raw| !raw.is_empty())
                .map(str::to_string);

            Some(InstalledRuntime {
                name: name.to_string(),
                version: version.to_string(),
                location,
            })
        })
        .collect()
}

/// Runtimes present in `after` that were not listed in `before`.
#[must_use]
pub fn newly_installed<'a>(
    before: &[InstalledRuntime],
    after: &'a [InstalledRuntime],
) -> Vec<&'a InstalledRuntime> {
    after
        .iter()
        .filter(|runtime| {
            !before
                .iter()
                .any(|existing| existing.is(&runtime.name, &runtime.version))
        })
        .collect()
}
