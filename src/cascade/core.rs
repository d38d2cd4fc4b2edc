// src/cascade/core.rs

//! Pure selection-cascade state machine.
//!
//! [`CascadeCore`] holds the state of every level in the configured layout
//! and decides which level to query next. It never performs a query itself:
//! each transition returns the [`LevelQuery`] the async shell
//! ([`CascadeController`](super::CascadeController)) should run, and the
//! shell feeds the outcome back through [`CascadeCore::apply`].
//!
//! Every upstream change bumps an epoch. A query result carrying an older
//! epoch belongs to a superseded resolution and is dropped.

use tracing::debug;

use crate::catalog::{Choice, Filters, Selection, SelectionLevel, display_values};
use crate::errors::UsageError;
use crate::exec::ResultRow;
use crate::types::CascadeLayout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelState {
    Unresolved,
    Loading,
    Ready,
    /// An upstream choice changed; waiting for its turn to reload.
    Stale,
    Failed(String),
}

/// Snapshot of one level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelView {
    pub level: SelectionLevel,
    pub state: LevelState,
    /// Rows from the last successful query, sorted by display field.
    pub options: Vec<ResultRow>,
    pub chosen: Option<Choice>,
}

impl LevelView {
    fn new(level: SelectionLevel) -> Self {
        Self {
            level,
            state: LevelState::Unresolved,
            options: Vec::new(),
            chosen: None,
        }
    }

    /// Distinct display values of the options, in option order.
    pub fn option_values(&self) -> Vec<String> {
        display_values(&self.options, self.level.display_field())
    }

    pub fn is_ready(&self) -> bool {
        self.state == LevelState::Ready
    }

    fn clear(&mut self, state: LevelState) {
        self.state = state;
        self.options.clear();
        self.chosen = None;
    }
}

/// A listing query the shell should run next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelQuery {
    pub level: SelectionLevel,
    /// Chosen values of the levels above `level`, and nothing else.
    pub filters: Filters,
    pub epoch: u64,
}

#[derive(Debug, Clone)]
pub struct CascadeCore {
    layout: CascadeLayout,
    levels: Vec<LevelView>,
    epoch: u64,
}

impl CascadeCore {
    pub fn new(layout: CascadeLayout) -> Self {
        Self {
            layout,
            levels: layout.levels().iter().copied().map(LevelView::new).collect(),
            epoch: 0,
        }
    }

    pub fn layout(&self) -> CascadeLayout {
        self.layout
    }

    pub fn views(&self) -> &[LevelView] {
        &self.levels
    }

    pub fn view(&self, level: SelectionLevel) -> Option<&LevelView> {
        self.index_of(level).map(|i| &self.levels[i])
    }

    pub fn state_of(&self, level: SelectionLevel) -> Option<&LevelState> {
        self.view(level).map(|v| &v.state)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Catalog initialization finished: the root level starts loading and
    /// everything below it is unresolved.
    pub fn mark_initialized(&mut self) -> LevelQuery {
        self.epoch += 1;
        for view in &mut self.levels {
            view.clear(LevelState::Unresolved);
        }
        self.levels[0].state = LevelState::Loading;
        self.query_for(0)
    }

    /// Record a user choice at `level`.
    ///
    /// Every level below it turns stale and loses its choice; the first of
    /// them starts loading and its query is returned. Returns `None` when
    /// `level` is the last one in the layout.
    pub fn choose(
        &mut self,
        level: SelectionLevel,
        choice: Choice,
    ) -> Result<Option<LevelQuery>, UsageError> {
        let idx = self
            .index_of(level)
            .ok_or(UsageError::LevelNotInLayout(level))?;

        let view = &self.levels[idx];
        if !view.is_ready() {
            return Err(UsageError::LevelNotReady(level));
        }

        let accepted = match &choice {
            Choice::All => level == SelectionLevel::Edition,
            Choice::Value(v) => view.option_values().iter().any(|o| o == v),
        };
        if !accepted {
            return Err(UsageError::UnknownChoice {
                level,
                value: choice.to_string(),
            });
        }

        debug!(%level, %choice, "level chosen");
        self.levels[idx].chosen = Some(choice);
        self.epoch += 1;

        for view in &mut self.levels[idx + 1..] {
            view.clear(LevelState::Stale);
        }

        Ok(self.start_loading(idx + 1))
    }

    /// Whether `query` still belongs to the current resolution.
    pub fn is_current(&self, query: &LevelQuery) -> bool {
        query.epoch == self.epoch
            && self
                .view(query.level)
                .is_some_and(|v| v.state == LevelState::Loading)
    }

    /// Feed back the outcome of `query`.
    ///
    /// On success the level becomes ready, picks its default (the first
    /// option, or `All` for editions) and the next level's query is
    /// returned. A non-edition level without options ends the chain, as does
    /// a failure or a superseded query.
    pub fn apply(
        &mut self,
        query: &LevelQuery,
        outcome: Result<Vec<ResultRow>, String>,
    ) -> Option<LevelQuery> {
        if !self.is_current(query) {
            debug!(
                level = %query.level,
                epoch = query.epoch,
                current = self.epoch,
                "discarding result of superseded query"
            );
            return None;
        }
        let idx = self.index_of(query.level)?;

        let rows = match outcome {
            Ok(rows) => rows,
            Err(message) => {
                self.levels[idx].clear(LevelState::Failed(message));
                return None;
            }
        };

        let view = &mut self.levels[idx];
        view.options = rows;
        view.state = LevelState::Ready;
        // `All` is always on offer for editions, even when none were listed.
        view.chosen = if view.level == SelectionLevel::Edition {
            Some(Choice::All)
        } else {
            view.option_values().into_iter().next().map(Choice::Value)
        };

        if view.chosen.is_none() {
            debug!(level = %view.level, "level has no options; cascade stops here");
            return None;
        }

        self.start_loading(idx + 1)
    }

    /// Every level of the layout is ready and has a choice.
    pub fn is_launch_ready(&self) -> bool {
        self.levels
            .iter()
            .all(|v| v.is_ready() && v.chosen.is_some())
    }

    /// The resolved selection, once [`is_launch_ready`](Self::is_launch_ready).
    pub fn selection(&self) -> Option<Selection> {
        if !self.is_launch_ready() {
            return None;
        }
        let value = |level: SelectionLevel| -> Option<String> {
            self.view(level)?
                .chosen
                .as_ref()?
                .as_value()
                .map(str::to_string)
        };

        Some(Selection {
            product: value(SelectionLevel::Product)?,
            architecture: value(SelectionLevel::Architecture)?,
            language: value(SelectionLevel::Language)?,
            media: value(SelectionLevel::Media),
            edition: self
                .view(SelectionLevel::Edition)
                .and_then(|v| v.chosen.clone())
                .unwrap_or(Choice::All),
        })
    }

    /// Clear every level back to unresolved.
    pub fn reset(&mut self) {
        self.epoch += 1;
        for view in &mut self.levels {
            view.clear(LevelState::Unresolved);
        }
    }

    fn index_of(&self, level: SelectionLevel) -> Option<usize> {
        self.levels.iter().position(|v| v.level == level)
    }

    fn start_loading(&mut self, idx: usize) -> Option<LevelQuery> {
        let view = self.levels.get_mut(idx)?;
        view.state = LevelState::Loading;
        Some(self.query_for(idx))
    }

    fn query_for(&self, idx: usize) -> LevelQuery {
        let filters = self.levels[..idx]
            .iter()
            .filter_map(|v| Some((v.level, v.chosen.as_ref()?.as_value()?)))
            .fold(Filters::new(), |f, (level, value)| f.with(level, value));
        LevelQuery {
            level: self.levels[idx].level,
            filters,
            epoch: self.epoch,
        }
    }
}
