mod client;
mod types;

pub use client::{GitHubClient, GitHubFetcher};
pub use types::{EventRepo, GitHubError, PublicEvent, RepoSummary};
