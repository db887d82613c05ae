// ---------------------------------------------------------------------------
// Format migration selector
// ---------------------------------------------------------------------------
//
// Decides which container (if any) supplies the tree buffer for this save:
//
//   NoneChecked -> NativeFound                         (done)
//               -> NativeAbsent -> LegacyBFound        (done, unless ignored)
//                               -> LegacyBAbsent -> LegacyCPresent -> LegacyCValid   (done)
//                                                                  -> LegacyCInvalid -> NothingFound
//                                                -> NothingFound
//   NothingFound -> ConfiguredLimitAboveNative         (expand, done)
//                -> ConfiguredLimitAtNative            (no-op, done)
//
// A container that is present but fails to decode falls through to the next
// candidate; its error is kept on the outcome for the caller to log.

use bevy::log::{debug, warn};

use crate::codec::{ContainerDecoder, DecodeInput, PopulatedBuffer, TreeCodec};
use crate::containers::unlimited_trees;
use crate::data_store::DataStore;
use crate::prefab_codec::SimulationPrefabs;
use crate::save_error::SaveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    NoneChecked,
    NativeFound,
    NativeAbsent,
    LegacyBFound,
    LegacyBAbsent,
    LegacyCPresent,
    LegacyCValid,
    LegacyCInvalid,
    NothingFound,
    ConfiguredLimitAboveNative,
    ConfiguredLimitAtNative,
}

impl SelectorState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SelectorState::NativeFound
                | SelectorState::LegacyBFound
                | SelectorState::LegacyCValid
                | SelectorState::ConfiguredLimitAboveNative
                | SelectorState::ConfiguredLimitAtNative
        )
    }
}

/// What the load pipeline should do with the host buffer.
#[derive(Debug)]
pub enum Selection {
    /// A container supplied a fully populated buffer.
    Decoded {
        codec: TreeCodec,
        populated: PopulatedBuffer,
    },
    /// No container: grow the native buffer to the configured limit.
    Expand { capacity: u32 },
    /// No container and no custom limit: keep the native buffer.
    KeepNative,
}

#[derive(Debug)]
pub struct SelectionOutcome {
    pub selection: Selection,
    /// Every state visited, starting with `NoneChecked`.
    pub trace: Vec<SelectorState>,
    /// Containers that were present but rejected.
    pub rejected: Vec<(TreeCodec, SaveError)>,
}

impl SelectionOutcome {
    pub fn terminal_state(&self) -> SelectorState {
        self.trace
            .last()
            .copied()
            .unwrap_or(SelectorState::NoneChecked)
    }
}

struct Selector<'a, 'b> {
    store: &'a dyn DataStore,
    input: &'a DecodeInput<'b>,
    ignore_legacy_b: bool,
    prefabs: &'a mut SimulationPrefabs,
    decoder: &'a mut dyn ContainerDecoder,
    trace: Vec<SelectorState>,
    rejected: Vec<(TreeCodec, SaveError)>,
}

impl Selector<'_, '_> {
    fn enter(&mut self, state: SelectorState) {
        debug!("tree data selector: {state:?}");
        self.trace.push(state);
    }

    /// Decodes `codec` if its key is present. `None` means absent or rejected;
    /// a rejected container leaves the prefab table as it was.
    fn try_decode(&mut self, codec: TreeCodec) -> Option<PopulatedBuffer> {
        let blob = self.store.get(codec.key())?;
        let mut staged = self.prefabs.clone();
        match self.decoder.decode(codec, blob, self.input, &mut staged) {
            Ok(populated) => {
                *self.prefabs = staged;
                Some(populated)
            }
            Err(err) => {
                warn!("failed to load {} data: {err}", codec.key());
                self.rejected.push((codec, err));
                None
            }
        }
    }

    fn step(&mut self, state: SelectorState) -> (SelectorState, Option<Selection>) {
        match state {
            SelectorState::NoneChecked => match self.try_decode(TreeCodec::Expanded) {
                Some(populated) => (
                    SelectorState::NativeFound,
                    Some(Selection::Decoded {
                        codec: TreeCodec::Expanded,
                        populated,
                    }),
                ),
                None => (SelectorState::NativeAbsent, None),
            },
            SelectorState::NativeAbsent => {
                if self.ignore_legacy_b {
                    debug!("ignoring {} data by configuration", TreeCodec::TreeAnarchy.key());
                    return (SelectorState::LegacyBAbsent, None);
                }
                match self.try_decode(TreeCodec::TreeAnarchy) {
                    Some(populated) => (
                        SelectorState::LegacyBFound,
                        Some(Selection::Decoded {
                            codec: TreeCodec::TreeAnarchy,
                            populated,
                        }),
                    ),
                    None => (SelectorState::LegacyBAbsent, None),
                }
            }
            SelectorState::LegacyBAbsent => {
                if self.store.contains(TreeCodec::UnlimitedTrees.key()) {
                    (SelectorState::LegacyCPresent, None)
                } else {
                    (SelectorState::NothingFound, None)
                }
            }
            SelectorState::LegacyCPresent => {
                let codec = TreeCodec::UnlimitedTrees;
                let valid = match self.store.get(codec.key()).map(unlimited_trees::validate) {
                    Some(Ok(())) => true,
                    Some(Err(err)) => {
                        warn!("rejecting {} data: {err}", codec.key());
                        self.rejected.push((codec, err));
                        false
                    }
                    None => false,
                };
                if !valid {
                    return (SelectorState::LegacyCInvalid, None);
                }
                match self.try_decode(codec) {
                    Some(populated) => (
                        SelectorState::LegacyCValid,
                        Some(Selection::Decoded { codec, populated }),
                    ),
                    None => (SelectorState::LegacyCInvalid, None),
                }
            }
            SelectorState::LegacyCInvalid => (SelectorState::NothingFound, None),
            SelectorState::NothingFound => {
                if self.input.configured_limit > self.input.native_capacity {
                    (
                        SelectorState::ConfiguredLimitAboveNative,
                        Some(Selection::Expand {
                            capacity: self.input.configured_limit,
                        }),
                    )
                } else {
                    (SelectorState::ConfiguredLimitAtNative, Some(Selection::KeepNative))
                }
            }
            terminal => (terminal, Some(Selection::KeepNative)),
        }
    }
}

/// Runs the selector over `store`. Never fails: rejected containers are
/// reported on the outcome and the machine moves on.
pub fn select(
    store: &dyn DataStore,
    input: &DecodeInput<'_>,
    ignore_legacy_b: bool,
    prefabs: &mut SimulationPrefabs,
    decoder: &mut dyn ContainerDecoder,
) -> SelectionOutcome {
    let mut selector = Selector {
        store,
        input,
        ignore_legacy_b,
        prefabs,
        decoder,
        trace: Vec::new(),
        rejected: Vec::new(),
    };

    let mut state = SelectorState::NoneChecked;
    selector.enter(state);
    let selection = loop {
        let (next, selection) = selector.step(state);
        selector.enter(next);
        state = next;
        if let Some(selection) = selection {
            debug_assert!(state.is_terminal());
            break selection;
        }
    };

    SelectionOutcome {
        selection,
        trace: selector.trace,
        rejected: selector.rejected,
    }
}
