/// Non-fatal messages produced while an operation runs.
///
/// Warnings do not abort the operation; they are surfaced to the caller alongside the result.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Reports {
    pub warnings: Vec<String>,
}

impl Reports {
    pub fn warn(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::warn!("{msg}");
        self.warnings.push(msg);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}
