//! Newtype 64-bit IDs assigned by the catalog store (spec §3: "All IDs are
//! stable 64-bit integers assigned by the store").

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(v: i64) -> Self {
                $name(v)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok($name(s.parse()?))
            }
        }
    };
}

id_type!(UserId);
id_type!(StorageRootId);
id_type!(MediaId);
id_type!(ShowId);
id_type!(SeasonId);
id_type!(EpisodeId);
id_type!(ExtraId);
id_type!(SectionId);
id_type!(PlaylistId);
id_type!(ChannelId);

/// A reference to anything that can appear in a playlist, schedule, or
/// watch-progress row. The catalog never models these as in-memory
/// pointers (spec §9 "Cyclic ownership") — only as a tagged (kind, id)
/// pair that round-trips through the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Episode,
    Extra,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MediaKind::Movie => "movie",
            MediaKind::Episode => "episode",
            MediaKind::Extra => "extra",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaKind::Movie),
            "episode" => Ok(MediaKind::Episode),
            "extra" => Ok(MediaKind::Extra),
            other => Err(format!("unknown media kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub id: i64,
}

impl MediaRef {
    pub fn movie(id: MediaId) -> Self {
        Self {
            kind: MediaKind::Movie,
            id: id.0,
        }
    }
    pub fn episode(id: EpisodeId) -> Self {
        Self {
            kind: MediaKind::Episode,
            id: id.0,
        }
    }
    pub fn extra(id: ExtraId) -> Self {
        Self {
            kind: MediaKind::Extra,
            id: id.0,
        }
    }
}
