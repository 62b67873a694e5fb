//! Concrete upstream clients

mod github;
mod maven_central;

pub use github::GitHubSourceHost;
pub use maven_central::MavenCentralRegistry;
