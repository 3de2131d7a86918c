use crate::exec::temp::ScopedFile;

/// Ordered command-line tokens applied so far, plus the temporary files they reference.
///
/// Every push writes a flag and all of its values in one step, so the sequence never holds a
/// dangling flag. Cloning copies the tokens; referenced temporary files are shared and removed
/// once the last clone is dropped.
#[derive(Clone, Debug, Default)]
pub struct Arguments {
    tokens: Vec<String>,
    resources: Vec<ScopedFile>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a flag that takes no value.
    pub fn push_flag(&mut self, flag: &str) {
        self.tokens.push(flag.to_string());
    }

    /// Append `flag` followed by its values, in order.
    pub fn push<I, S>(&mut self, flag: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        self.tokens.reserve(values.len() + 1);
        self.tokens.push(flag.to_string());
        self.tokens.extend(values);
    }

    /// Append a parenthesized sub-sequence (`( ... )`) and adopt its temporary files.
    pub(crate) fn push_group(&mut self, tokens: Vec<String>, resources: &[ScopedFile]) {
        self.tokens.reserve(tokens.len() + 2);
        self.tokens.push("(".to_string());
        self.tokens.extend(tokens);
        self.tokens.push(")".to_string());
        self.resources.extend(resources.iter().cloned());
    }

    /// Keep `file` alive for as long as these arguments exist.
    pub(crate) fn attach(&mut self, file: ScopedFile) {
        self.resources.push(file);
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub(crate) fn resources(&self) -> &[ScopedFile] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl PartialEq for Arguments {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

impl Eq for Arguments {}

#[cfg(test)]
#[path = "../../tests/unit/image/arguments.rs"]
mod tests;
