//! Disease class catalogue endpoint

use axum::Json;
use serde::Serialize;
use tmt_common::classes::{is_healthy_label, CLASS_NAMES};

#[derive(Debug, Serialize)]
pub struct ClassEntry {
    pub index: usize,
    pub label: &'static str,
    pub healthy: bool,
}

/// GET /api/classes
///
/// Labels in classifier output order
pub async fn list_classes() -> Json<Vec<ClassEntry>> {
    Json(
        CLASS_NAMES
            .iter()
            .enumerate()
            .map(|(index, &label)| ClassEntry {
                index,
                label,
                healthy: is_healthy_label(label),
            })
            .collect(),
    )
}
