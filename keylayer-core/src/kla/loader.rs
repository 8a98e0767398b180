use super::error::{KlaError, Result};
use super::format::*;
use crate::types::{Action, Document, KeyBinding, KeyMap, State, StateRef, Terminator, Transition, When};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

pub struct KlaLoader;

impl KlaLoader {
    /// Load a document from `.kla` binary data
    pub fn load(data: &[u8]) -> Result<Document> {
        if data.len() < MIN_FILE_SIZE {
            return Err(KlaError::FileTooSmall(data.len()));
        }

        let mut cursor = Cursor::new(data);

        let mut magic = [0u8; 4];
        cursor.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(KlaError::InvalidMagicCode(magic));
        }

        let major = cursor.read_u8()?;
        let minor = cursor.read_u8()?;
        if major != VERSION_MAJOR || minor > VERSION_MINOR {
            return Err(KlaError::UnsupportedVersion { major, minor });
        }

        let id = cursor.read_i64::<LittleEndian>()?;
        let name = Self::read_string(&mut cursor)?;

        let keymap_count = cursor.read_u16::<LittleEndian>()? as usize;
        let action_count = cursor.read_u16::<LittleEndian>()? as usize;
        let terminator_count = cursor.read_u16::<LittleEndian>()? as usize;

        let keymaps = Self::read_keymaps(&mut cursor, keymap_count)?;
        let actions = Self::read_actions(&mut cursor, action_count)?;
        let terminators = Self::read_terminators(&mut cursor, terminator_count)?;

        let remaining = data.len() - cursor.position() as usize;
        if remaining > 0 {
            return Err(KlaError::TrailingData(remaining));
        }

        Ok(Document {
            id,
            name,
            keymaps,
            actions,
            terminators,
        })
    }

    /// Read a u16-length-prefixed UTF-16LE string
    fn read_string(cursor: &mut Cursor<&[u8]>) -> Result<String> {
        let length = cursor.read_u16::<LittleEndian>()? as usize;
        let mut utf16_data = vec![0u16; length];
        cursor.read_u16_into::<LittleEndian>(&mut utf16_data)?;

        String::from_utf16(&utf16_data).map_err(|_| KlaError::InvalidUtf16(cursor.position() as usize))
    }

    fn read_keymaps(cursor: &mut Cursor<&[u8]>, count: usize) -> Result<Vec<KeyMap>> {
        let mut keymaps = Vec::with_capacity(count);

        for _ in 0..count {
            let index = cursor.read_u16::<LittleEndian>()?;
            let key_count = cursor.read_u16::<LittleEndian>()? as usize;
            let mut keys = Vec::with_capacity(key_count);

            for _ in 0..key_count {
                let code = cursor.read_u16::<LittleEndian>()?;
                let flags = cursor.read_u8()?;
                if flags & !(KEY_HAS_OUTPUT | KEY_HAS_ACTION) != 0 {
                    return Err(KlaError::InvalidKeyFlags { code, flags });
                }

                let output = if flags & KEY_HAS_OUTPUT != 0 {
                    Some(Self::read_string(cursor)?)
                } else {
                    None
                };
                let action = if flags & KEY_HAS_ACTION != 0 {
                    Some(Self::read_string(cursor)?)
                } else {
                    None
                };

                keys.push(KeyBinding { code, output, action });
            }

            keymaps.push(KeyMap::with_keys(index, keys));
        }

        Ok(keymaps)
    }

    fn read_actions(cursor: &mut Cursor<&[u8]>, count: usize) -> Result<Vec<Action>> {
        let mut actions = Vec::with_capacity(count);

        for _ in 0..count {
            let id = Self::read_string(cursor)?;
            let reserved = cursor.read_u8()? != 0;
            let transition_count = cursor.read_u16::<LittleEndian>()? as usize;
            let mut transitions = Vec::with_capacity(transition_count);

            for _ in 0..transition_count {
                let kind = cursor.read_u8()?;
                let scope = cursor.read_u8()?;
                let state = cursor.read_u32::<LittleEndian>()?;

                let state = match scope {
                    SCOPE_BASELINE => StateRef::Baseline,
                    SCOPE_STATE => StateRef::State(State(state)),
                    _ => return Err(KlaError::InvalidScope(scope, id)),
                };

                let transition = match kind {
                    TRANSITION_EMIT => Transition::Emit(Self::read_string(cursor)?),
                    TRANSITION_ADVANCE => Transition::Advance(State(cursor.read_u32::<LittleEndian>()?)),
                    _ => return Err(KlaError::InvalidTransitionKind(kind, id)),
                };

                transitions.push(When::new(state, transition));
            }

            actions.push(Action {
                id,
                reserved,
                transitions,
            });
        }

        Ok(actions)
    }

    fn read_terminators(cursor: &mut Cursor<&[u8]>, count: usize) -> Result<Vec<Terminator>> {
        let mut terminators = Vec::with_capacity(count);

        for _ in 0..count {
            let state = State(cursor.read_u32::<LittleEndian>()?);
            let output = Self::read_string(cursor)?;
            terminators.push(Terminator::new(state, output));
        }

        Ok(terminators)
    }
}
