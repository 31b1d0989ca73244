//! Insert / update / remove over id-keyed document collections.
//!
//! `None` is an uninitialized collection: nothing has been fetched yet.

use shared::domain::Document;

/// Upserts `document`. An uninitialized collection becomes `[document]`.
pub fn insert<T: Document>(documents: Option<Vec<T>>, document: T) -> Option<Vec<T>> {
    let Some(mut documents) = documents else {
        return Some(vec![document]);
    };
    match documents.iter().position(|entry| entry.id() == document.id()) {
        Some(index) => documents[index] = document,
        None => documents.push(document),
    }
    Some(documents)
}

/// Replaces the whole record with the same id. Unknown ids are ignored.
pub fn update<T: Document>(documents: Option<Vec<T>>, document: T) -> Option<Vec<T>> {
    documents.map(|mut documents| {
        if let Some(entry) = documents
            .iter_mut()
            .find(|entry| entry.id() == document.id())
        {
            *entry = document;
        }
        documents
    })
}

pub fn remove<T: Document>(documents: Option<Vec<T>>, ids: &[String]) -> Option<Vec<T>> {
    documents.map(|documents| {
        documents
            .into_iter()
            .filter(|entry| !ids.iter().any(|id| id == entry.id()))
            .collect()
    })
}

/// Replaces `current` when it has the same id as `document`.
pub fn replace_if_same<T: Document>(current: Option<T>, document: &T) -> Option<T>
where
    T: Clone,
{
    match current {
        Some(current) if current.id() == document.id() => Some(document.clone()),
        other => other,
    }
}

#[cfg(test)]
#[path = "tests/collection_tests.rs"]
mod tests;
