use crate::domain::HabitId;
use anyhow::Result;
use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionChange {
    Marked,
    Unmarked,
}

/// Context provided to completion hooks
#[derive(Debug, Clone)]
pub struct CompletionContext {
    pub habit_id: HabitId,
    pub habit_name: String,
    pub date: NaiveDate,
    pub change: CompletionChange,
    pub streak: u32,
    pub data_dir: PathBuf,
}

/// Trait for plugins that respond to a habit being marked or unmarked
pub trait CompletionHook: Send + Sync {
    /// Called after the log change has been stored
    fn on_completion_changed(&self, context: &CompletionContext) -> Result<()>;

    /// Human-readable name for this hook
    fn name(&self) -> &str;

    /// Whether this hook should be enabled by default
    fn enabled_by_default(&self) -> bool {
        true
    }
}

/// Registry for managing completion hooks
pub struct HookRegistry {
    hooks: Vec<Box<dyn CompletionHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Registry with every hook that is enabled by default
    pub fn with_defaults<I>(hooks: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn CompletionHook>>,
    {
        Self {
            hooks: hooks
                .into_iter()
                .filter(|hook| hook.enabled_by_default())
                .collect(),
        }
    }

    /// Register a new completion hook
    pub fn register<H>(&mut self, hook: H)
    where
        H: CompletionHook + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    /// Run every hook. A failing hook is logged and the rest still run.
    pub fn execute_completion_hooks(&self, context: &CompletionContext) {
        for hook in &self.hooks {
            if let Err(e) = hook.on_completion_changed(context) {
                log::warn!("Hook '{}' failed: {:#}", hook.name(), e);
            }
        }
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
