use serde::{Deserialize, Serialize};
use std::fmt;

/// One goroutine block of a stack dump.
///
/// Built fresh by a single parse pass and handed to the caller; nothing in the parser
/// keeps a reference to it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goroutine {
    /// Identifier assigned by the runtime. Not validated for uniqueness.
    pub id: i64,
    /// Scheduling state as printed, e.g. `running`, `chan receive`, `IO wait`.
    pub status: String,
    /// Minutes spent waiting. `0` both when the header says so and when it says nothing.
    pub wait_since_minutes: u64,
    pub locked_to_thread: bool,
    /// Outermost call first, in the order the dump printed it.
    pub stack_trace: Vec<StackFrame>,
    /// Call site that spawned the goroutine. Absent for `main` and runtime roots.
    pub created_by: Option<StackFrame>,
}

impl Goroutine {
    /// Creates a goroutine with an empty stack, as decoded from its header.
    pub fn new(id: i64, status: impl Into<String>) -> Self {
        Self {
            id,
            status: status.into(),
            wait_since_minutes: 0,
            locked_to_thread: false,
            stack_trace: Vec::new(),
            created_by: None,
        }
    }

    /// Iterates the trace frames followed by the `created by` frame, if any.
    pub fn full_stack(&self) -> impl Iterator<Item = &StackFrame> {
        self.stack_trace.iter().chain(self.created_by.as_ref())
    }

    /// Returns true if any frame of the full stack renders to text containing `needle`.
    pub fn stack_contains(&self, needle: &str) -> bool {
        stack_contains(self.full_stack(), needle)
    }
}

/// A single call-stack entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackFrame {
    pub function_name: String,
    /// Source path exactly as the runtime printed it.
    pub file: String,
    pub line: i32,
    /// Program-counter offset relative to the function entry (`+0x…`).
    pub position: Option<u64>,
}

impl StackFrame {
    pub fn new(
        function_name: impl Into<String>,
        file: impl Into<String>,
        line: i32,
        position: Option<u64>,
    ) -> Self {
        Self {
            function_name: function_name.into(),
            file: file.into(),
            line,
            position,
        }
    }
}

impl fmt::Display for StackFrame {
    /// Renders the frame for display:
    ///
    /// ```text
    /// main.foo
    ///    file:///a/b.go#10 +0x1a
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n   file://{}#{}",
            self.function_name, self.file, self.line
        )?;
        if let Some(position) = self.position {
            write!(f, " +0x{position:x}")?;
        }
        Ok(())
    }
}

/// Returns true if at least one frame's rendering contains `needle`, ignoring case.
///
/// An empty frame sequence never matches.
pub fn stack_contains<'a, I>(frames: I, needle: &str) -> bool
where
    I: IntoIterator<Item = &'a StackFrame>,
{
    let needle = needle.to_lowercase();
    frames
        .into_iter()
        .any(|frame| frame.to_string().to_lowercase().contains(&needle))
}
