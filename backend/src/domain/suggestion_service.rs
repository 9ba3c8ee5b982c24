//! Furniture suggestions for a scanned room.

use std::sync::Arc;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::warn;

use crate::domain::ports::{ObjectDetector, SuggestionQuery};
use crate::domain::{
    Error, Suggestion, fallback_suggestions, is_plain_file_name, suggestions_from_catalogue,
};

/// Suggestion service implementing [`SuggestionQuery`].
#[derive(Clone)]
pub struct SuggestionService<D: ?Sized> {
    detector: Arc<D>,
}

impl<D: ?Sized> SuggestionService<D> {
    pub fn new(detector: Arc<D>) -> Self {
        Self { detector }
    }
}

#[async_trait]
impl<D> SuggestionQuery for SuggestionService<D>
where
    D: ObjectDetector + ?Sized,
{
    async fn suggestions_for(&self, filename: &str) -> Result<Vec<Suggestion>, Error> {
        if !is_plain_file_name(filename) {
            return Err(Error::invalid_request(format!(
                "invalid image file name: {filename}"
            )));
        }

        match self.detector.categories().await {
            Ok(catalogue) => {
                let mut rng = SmallRng::from_entropy();
                let suggestions = suggestions_from_catalogue(&catalogue, &mut rng);
                if suggestions.is_empty() {
                    Ok(fallback_suggestions())
                } else {
                    Ok(suggestions)
                }
            }
            Err(err) => {
                warn!(%err, "category catalogue unavailable; serving fallback suggestions");
                Ok(fallback_suggestions())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{MockObjectDetector, ObjectDetectorError};
    use crate::domain::{ErrorCode, MAX_SUGGESTIONS};

    fn service(detector: MockObjectDetector) -> SuggestionService<MockObjectDetector> {
        SuggestionService::new(Arc::new(detector))
    }

    #[rstest]
    #[tokio::test]
    async fn builds_suggestions_from_catalogue() {
        let mut detector = MockObjectDetector::new();
        detector.expect_categories().return_once(|| {
            Ok(BTreeMap::from([
                ("furniture".to_owned(), vec!["sofa".to_owned()]),
                ("lighting".to_owned(), vec!["floor_lamp".to_owned()]),
            ]))
        });

        let suggestions = service(detector)
            .suggestions_for("1700000000000-room.jpg")
            .await
            .expect("suggestions");

        let names: Vec<&str> = suggestions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Sofa", "Floor lamp"]);
    }

    #[rstest]
    #[case::unreachable(Err(ObjectDetectorError::unreachable("refused")))]
    #[case::empty(Ok(BTreeMap::new()))]
    #[tokio::test]
    async fn falls_back_to_static_suggestions(
        #[case] catalogue: Result<crate::domain::ports::DetectorCatalogue, ObjectDetectorError>,
    ) {
        let mut detector = MockObjectDetector::new();
        detector.expect_categories().return_once(move || catalogue);

        let suggestions = service(detector)
            .suggestions_for("room.jpg")
            .await
            .expect("fallback");

        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(suggestions[0].name, "Minimalist Lamp");
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_path_like_file_names() {
        let mut detector = MockObjectDetector::new();
        detector.expect_categories().never();

        let error = service(detector)
            .suggestions_for("../secrets.env")
            .await
            .expect_err("unsafe name");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }
}
