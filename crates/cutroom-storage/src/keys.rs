//! Bucket key scheme.

use cutroom_models::{AccountId, BlobLocator, VideoId};

/// Locator for a submitted draft's source file.
///
/// Keys are namespaced by creator so one creator's drafts can be listed or
/// swept with a single prefix.
pub fn draft_locator(creator_id: &AccountId, video_id: &VideoId) -> BlobLocator {
    BlobLocator::from_string(format!("drafts/{}/{}/source.mp4", creator_id, video_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_locator_shape() {
        let creator = AccountId::from_string("c1");
        let video = VideoId::from_string("v1");
        assert_eq!(
            draft_locator(&creator, &video).as_str(),
            "drafts/c1/v1/source.mp4"
        );
    }
}
