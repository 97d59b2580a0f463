use crate::error::CatalogError;
use crate::resolver::TrackQuery;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// How many of an artist's top tracks an artist request plays.
pub const ARTIST_TRACK_LIMIT: usize = 10;

/// Music catalog lookups that expand a name into an ordered list of tracks.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Up to [`ARTIST_TRACK_LIMIT`] queries of the form "<artist> <title>"
    /// for the first artist matching `name`.
    async fn search_by_artist(&self, name: &str) -> Result<Vec<TrackQuery>, CatalogError>;

    /// Queries of the form "<title> <artist>" for the first playlist
    /// matching `name`, in playlist order.
    async fn search_by_playlist(&self, name: &str) -> Result<Vec<TrackQuery>, CatalogError>;
}
