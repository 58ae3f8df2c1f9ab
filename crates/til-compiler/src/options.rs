//! Code generation settings.

/// Settings for [`crate::CodeGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Label of the program entry point.
    pub entry_label: String,
    /// Prefix of the hidden globals that hold wrapped function values.
    pub wrapper_prefix: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            entry_label: "_main".to_string(),
            wrapper_prefix: "_wrapper_target_".to_string(),
        }
    }
}

impl CompilerOptions {
    pub fn with_entry_label(mut self, label: impl Into<String>) -> Self {
        self.entry_label = label.into();
        self
    }

    pub fn with_wrapper_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.wrapper_prefix = prefix.into();
        self
    }
}
