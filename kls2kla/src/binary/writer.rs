use keylayer_core::kla::format::*;
use keylayer_core::*;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

pub struct KlaWriter<W: Write> {
    writer: W,
}

impl<W: Write> KlaWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_document(mut self, doc: &Document) -> std::result::Result<(), KlsError> {
        self.write_header(doc)?;

        for keymap in &doc.keymaps {
            self.write_keymap(keymap)?;
        }

        for action in &doc.actions {
            self.write_action(action)?;
        }

        for terminator in &doc.terminators {
            self.writer.write_u32::<LittleEndian>(terminator.state.id())?;
            self.write_string(&terminator.output)?;
        }

        self.writer.flush()?;
        Ok(())
    }

    fn write_header(&mut self, doc: &Document) -> std::result::Result<(), KlsError> {
        self.writer.write_all(MAGIC)?;
        self.writer.write_u8(VERSION_MAJOR)?;
        self.writer.write_u8(VERSION_MINOR)?;
        self.writer.write_i64::<LittleEndian>(doc.id)?;
        self.write_string(&doc.name)?;

        self.write_count(doc.keymaps.len(), "key maps")?;
        self.write_count(doc.actions.len(), "actions")?;
        self.write_count(doc.terminators.len(), "terminators")?;
        Ok(())
    }

    fn write_keymap(&mut self, keymap: &KeyMap) -> std::result::Result<(), KlsError> {
        self.writer.write_u16::<LittleEndian>(keymap.index)?;
        self.write_count(keymap.keys.len(), "keys")?;

        for key in &keymap.keys {
            let mut flags = 0;
            if key.output.is_some() {
                flags |= KEY_HAS_OUTPUT;
            }
            if key.action.is_some() {
                flags |= KEY_HAS_ACTION;
            }

            self.writer.write_u16::<LittleEndian>(key.code)?;
            self.writer.write_u8(flags)?;
            if let Some(output) = &key.output {
                self.write_string(output)?;
            }
            if let Some(action) = &key.action {
                self.write_string(action)?;
            }
        }

        Ok(())
    }

    fn write_action(&mut self, action: &Action) -> std::result::Result<(), KlsError> {
        self.write_string(&action.id)?;
        self.writer.write_u8(action.reserved as u8)?;
        self.write_count(action.transitions.len(), "transitions")?;

        for when in &action.transitions {
            let kind = match when.transition {
                Transition::Emit(_) => TRANSITION_EMIT,
                Transition::Advance(_) => TRANSITION_ADVANCE,
            };
            let (scope, state) = match when.state {
                StateRef::Baseline => (SCOPE_BASELINE, 0),
                StateRef::State(state) => (SCOPE_STATE, state.id()),
            };

            self.writer.write_u8(kind)?;
            self.writer.write_u8(scope)?;
            self.writer.write_u32::<LittleEndian>(state)?;

            match &when.transition {
                Transition::Emit(text) => self.write_string(text)?,
                Transition::Advance(target) => self.writer.write_u32::<LittleEndian>(target.id())?,
            }
        }

        Ok(())
    }

    fn write_count(&mut self, count: usize, what: &str) -> std::result::Result<(), KlsError> {
        let count = u16::try_from(count)
            .map_err(|_| KlsError::BinaryWrite(format!("Too many {}: {}", what, count)))?;
        self.writer.write_u16::<LittleEndian>(count)?;
        Ok(())
    }

    fn write_string(&mut self, s: &str) -> std::result::Result<(), KlsError> {
        let utf16: Vec<u16> = s.encode_utf16().collect();

        // Length in UTF-16 code units
        self.write_count(utf16.len(), "UTF-16 code units in a string")?;

        for code_unit in utf16 {
            self.writer.write_u16::<LittleEndian>(code_unit)?;
        }

        Ok(())
    }
}
