//! Fixed editorial listings for the site: hosted pages, game and app
//! releases, and the dynamically enumerated files repository. Not derived
//! data; edited by hand alongside releases.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct VersionEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<&'static str>,
    pub date: &'static str,
    pub log: &'static str,
    pub url: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectEntry {
    pub name: &'static str,
    pub repo_url: &'static str,
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileSource {
    pub name: &'static str,
    pub repo_url: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteContent {
    pub pages: Vec<ProjectEntry>,
    pub games: Vec<ProjectEntry>,
    pub apps: Vec<ProjectEntry>,
    pub files: Vec<FileSource>,
}

pub fn site_content() -> SiteContent {
    SiteContent {
        pages: vec![
            ProjectEntry {
                name: "kotobahitomi",
                repo_url: "https://github.com/dieWehmut/kotoba-hitomi",
                versions: vec![VersionEntry {
                    version: Some("v1.4"),
                    date: "2025-06-03",
                    log: "nihongo AI web app",
                    url: "https://kotoba-hitomi.hc-dsw-nexus.me/",
                }],
            },
            ProjectEntry {
                name: "showcase",
                repo_url: "https://github.com/dieWehmut/Showcase",
                versions: vec![VersionEntry {
                    version: None,
                    date: "2025-10-01",
                    log: "Project and Product Showcase",
                    url: "https://showcase.hc-dsw-nexus.me/",
                }],
            },
            ProjectEntry {
                name: "notes",
                repo_url: "https://github.com/dieWehmut/notes/",
                versions: vec![VersionEntry {
                    version: None,
                    date: "2025-08-20",
                    log: "my notes",
                    url: "https://notes.hc-dsw-nexus.me/",
                }],
            },
            ProjectEntry {
                name: "profile",
                repo_url: "https://github.com/dieWehmut/profile/",
                versions: vec![VersionEntry {
                    version: None,
                    date: "2025-08-16",
                    log: "personal profile",
                    url: "https://profile.hc-dsw-nexus.me/",
                }],
            },
            ProjectEntry {
                name: "nexus",
                repo_url: "https://github.com/dieWehmut/dieWehmut.github.io/",
                versions: vec![VersionEntry {
                    version: None,
                    date: "2025-08-26",
                    log: "nexus(This site)",
                    url: "https://www.hc-dsw-nexus.me/",
                }],
            },
        ],
        games: vec![ProjectEntry {
            name: "PhantomGenesis",
            repo_url: "https://github.com/dieWehmut/PhantomGenesis/",
            versions: vec![
                VersionEntry {
                    version: Some("v1.3"),
                    date: "2025-06-30",
                    log: "modified game",
                    url: "https://github.com/dieWehmut/showcase/releases/download/PhantomGenesis/PhantomGenesis1.3.zip",
                },
                VersionEntry {
                    version: Some("v1.2"),
                    date: "2025-06-30",
                    log: "first version release",
                    url: "https://github.com/dieWehmut/showcase/releases/download/PhantomGenesis/PhantomGenesis1.2.zip",
                },
            ],
        }],
        apps: vec![ProjectEntry {
            name: "kotobahitomi_android",
            repo_url: "https://github.com/dieWehmut/kotoba-hitomi",
            versions: vec![VersionEntry {
                version: Some("v1.0.0"),
                date: "2025-06-03",
                log: "First app release",
                url: "https://github.com/dieWehmut/showcase/releases/download/kotobahitomi/kotobahitomi.apk",
            }],
        }],
        files: vec![FileSource {
            name: "Files",
            repo_url: "https://github.com/dieWehmut/Files",
            description: "Repository listing (fetched from GitHub)",
        }],
    }
}
