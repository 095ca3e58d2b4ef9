//! Core trait definitions shared across the strucdev crates.

/// A type that carries a human-readable name.
pub trait Annotated {
    /// A human-readable name or identifier.
    fn name(&self) -> &str;
}

/// A type that can produce a summary of its contents.
pub trait Summarizable {
    /// A one-line summary suitable for display.
    fn summary(&self) -> String;
}
