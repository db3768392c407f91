//! `answer(text)`: classify → retrieve → synthesize.

use tracing::{debug, warn};

use crate::classify::QueryClassifier;
use crate::retrieve::RetrievalRouter;
use crate::synthesize::{synthesize, APOLOGY};
use crate::types::Answer;
use vetgraph_core::Result;
use vetgraph_store::SqliteStore;

/// Read-only question answering over the drug graph. Stateless per call.
pub struct QueryEngine<'a> {
    classifier: &'a QueryClassifier,
    router: RetrievalRouter<'a>,
}

impl<'a> QueryEngine<'a> {
    pub fn new(store: &'a SqliteStore, classifier: &'a QueryClassifier) -> Self {
        Self {
            classifier,
            router: RetrievalRouter::new(store),
        }
    }

    /// Answer a question. Never fails: internal errors become [`APOLOGY`].
    pub fn answer(&self, text: &str) -> String {
        match self.answer_detailed(text) {
            Ok(answer) => answer.response,
            Err(e) => {
                warn!("Error processing query {:?}: {}", text, e);
                APOLOGY.to_string()
            }
        }
    }

    /// Answer with the intermediate classification, surfacing store errors.
    pub fn answer_detailed(&self, text: &str) -> Result<Answer> {
        let classification = self.classifier.classify(text);
        debug!(
            "Classified as {} with drugs {:?}",
            classification.intent, classification.entities.drugs
        );

        let record = self
            .router
            .retrieve(classification.intent, &classification.entities)?;
        let response = synthesize(classification.intent, &record);

        Ok(Answer {
            intent: classification.intent,
            entities: classification.entities,
            found: !record.is_empty(),
            response,
        })
    }
}
