// ---------------------------------------------------------------------------
// prefab_codec – tree prefab index column with an interned name table
// ---------------------------------------------------------------------------
//
// Layout:
//   encoded u16 column of simulation prefab indices (one per occupied tree)
//   u16 name count
//   unique string per simulation prefab slot
//
// Indices refer to the host's simulation prefab table. Reading an index the
// table does not know yet grows the table; names arrive afterwards and fill
// empty slots without overwriting names the host already has.

use bevy::prelude::*;

use crate::data_serializer::{DataReader, DataWriter};
use crate::encoded_array::{write_column, ColumnReader};
use crate::save_error::SaveError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefabData {
    pub name: Option<String>,
    pub refcount: u32,
}

/// The host's simulation prefab table for trees.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationPrefabs {
    entries: Vec<PrefabData>,
}

impl SimulationPrefabs {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: u16) -> Option<&PrefabData> {
        self.entries.get(index as usize)
    }

    pub fn name(&self, index: u16) -> Option<&str> {
        self.get(index).and_then(|p| p.name.as_deref())
    }

    pub fn entries(&self) -> &[PrefabData] {
        &self.entries
    }

    /// Index of `name`, registering it if it is new.
    pub fn intern(&mut self, name: &str) -> u16 {
        if let Some(pos) = self
            .entries
            .iter()
            .position(|p| p.name.as_deref() == Some(name))
        {
            return pos as u16;
        }
        self.entries.push(PrefabData {
            name: Some(name.to_owned()),
            refcount: 0,
        });
        (self.entries.len() - 1) as u16
    }

    /// Counts a reference to `index`, growing the table to reach it.
    fn reference(&mut self, index: u16) {
        let slot = index as usize;
        if slot >= self.entries.len() {
            self.entries.resize(slot + 1, PrefabData::default());
        }
        self.entries[slot].refcount += 1;
    }

    fn merge_name(&mut self, slot: usize, name: Option<String>) {
        match self.entries.get_mut(slot) {
            Some(existing) => {
                if existing.name.is_none() {
                    existing.name = name;
                }
            }
            None => self.entries.push(PrefabData { name, refcount: 0 }),
        }
    }
}

/// Collects prefab indices and writes them with the name table.
#[derive(Debug, Default)]
pub struct PrefabColumnWriter {
    indices: Vec<u16>,
}

impl PrefabColumnWriter {
    pub fn begin() -> Self {
        Self::default()
    }

    pub fn write(&mut self, index: u16) {
        self.indices.push(index);
    }

    pub fn end(self, writer: &mut DataWriter, prefabs: &SimulationPrefabs) {
        write_column(writer, &self.indices);
        let count = prefabs.len().min(u16::MAX as usize);
        writer.write_u16(count as u16);
        for prefab in &prefabs.entries()[..count] {
            writer.write_unique_string(prefab.name.as_deref());
        }
    }
}

/// Reads prefab indices; [`PrefabColumnReader::end`] must be called to
/// consume the name table that follows the column.
#[derive(Debug)]
pub struct PrefabColumnReader {
    indices: ColumnReader<u16>,
}

impl PrefabColumnReader {
    pub fn begin(reader: &mut DataReader<'_>, container: &'static str) -> Result<Self, SaveError> {
        Ok(Self {
            indices: ColumnReader::begin(reader, container)?,
        })
    }

    pub fn read(&mut self, prefabs: &mut SimulationPrefabs) -> Result<u16, SaveError> {
        let index = self.indices.read()?;
        prefabs.reference(index);
        Ok(index)
    }

    pub fn consumed(&self) -> usize {
        self.indices.consumed()
    }

    pub fn end(
        self,
        reader: &mut DataReader<'_>,
        prefabs: &mut SimulationPrefabs,
    ) -> Result<(), SaveError> {
        let count = reader.read_u16()? as usize;
        for slot in 0..count {
            let name = reader.read_unique_string()?;
            prefabs.merge_name(slot, name);
        }
        Ok(())
    }
}
