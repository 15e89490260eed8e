//! Data models for the finder

pub mod catalog;
pub mod track_record;

pub use catalog::{
    join_artist_names, Album, ArtistProfile, ArtistRef, FeaturedPlaylist, TrackDetail, TrackStub,
};
pub use track_record::{clamp_popularity, TrackRecord, MAX_POPULARITY};
