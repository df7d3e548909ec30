use mongodb::bson::{Bson, Document, doc};
use mongodb::sync::{Client, Collection, Database};

use crate::action::DrawAction;
use crate::foundation::error::{PlacelapseError, PlacelapseResult};
use crate::source::{ActionIter, ActionSource};

/// Database used when the connection string has no path.
pub const DEFAULT_DATABASE: &str = "place";

/// Collection holding the action log.
pub const ACTIONS_COLLECTION: &str = "actions";

/// The `actions` collection of a live MongoDB deployment, read with a cursor sorted by
/// `create_at` ascending.
///
/// Documents are converted to relaxed extended JSON and decoded like an NDJSON export, so a
/// record that does not fit the action shape becomes an inert action instead of ending the run.
pub struct MongoSource {
    db: Database,
    actions: Collection<Document>,
}

impl MongoSource {
    /// Connect and ping the server. An unreachable deployment is an error here, before any
    /// output is produced.
    pub fn connect(uri: &str) -> PlacelapseResult<Self> {
        let client = Client::with_uri_str(uri)
            .map_err(|e| PlacelapseError::source(format!("invalid connection string: {e}")))?;
        let db = select_database(&client);

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .run()
            .map_err(|e| {
                PlacelapseError::source(format!("action source unreachable: {e}"))
            })?;
        tracing::info!(database = db.name(), "connected to action database");

        let actions = db.collection::<Document>(ACTIONS_COLLECTION);
        Ok(Self { db, actions })
    }

    pub fn database(&self) -> &str {
        self.db.name()
    }
}

/// The database named in the connection string path, or [`DEFAULT_DATABASE`].
fn select_database(client: &Client) -> Database {
    client
        .default_database()
        .unwrap_or_else(|| client.database(DEFAULT_DATABASE))
}

impl ActionSource for MongoSource {
    fn count(&mut self) -> PlacelapseResult<u64> {
        self.actions
            .count_documents(doc! {})
            .run()
            .map_err(|e| PlacelapseError::source(format!("count actions: {e}")))
    }

    fn actions(&mut self) -> PlacelapseResult<ActionIter<'_>> {
        let cursor = self
            .actions
            .find(doc! {})
            .sort(doc! { "create_at": 1 })
            .run()
            .map_err(|e| PlacelapseError::source(format!("query actions: {e}")))?;

        Ok(Box::new(cursor.enumerate().map(
            |(i, doc)| -> PlacelapseResult<DrawAction> {
                let doc = doc.map_err(|e| {
                    PlacelapseError::source(format!("read action {} from cursor: {e}", i + 1))
                })?;
                Ok(decode_document(doc, i + 1))
            },
        )))
    }
}

fn decode_document(doc: Document, index: usize) -> DrawAction {
    let json = Bson::Document(doc).into_relaxed_extjson();
    match serde_json::from_value::<DrawAction>(json) {
        Ok(action) => action,
        Err(e) => {
            tracing::warn!(index, error = %e, "unreadable action document, skipping");
            DrawAction::default()
        }
    }
}
