// Copyright (c) 2021, BlockProject 3D
//
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
//     * Redistributions of source code must retain the above copyright notice,
//       this list of conditions and the following disclaimer.
//     * Redistributions in binary form must reproduce the above copyright notice,
//       this list of conditions and the following disclaimer in the documentation
//       and/or other materials provided with the distribution.
//     * Neither the name of BlockProject 3D nor the names of its contributors
//       may be used to endorse or promote products derived from this software
//       without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT OWNER OR
// CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
// EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,
// PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
// PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF
// LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING
// NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE OF THIS
// SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! The extractor: registers a fixed set of paths, then drives a
//! depth-indexed, bitmap-pruned match over a [`Reader`].

use super::bitmap::Bitmap;
use super::path::{Control, Path, PathComponent};
use crate::error::{IonError, Result};
use crate::reader::Reader;
use crate::symbol::Symbol;

/// Configuration accepted by [`Extractor::new`].
#[derive(Debug, Clone, Copy)]
pub struct ExtractorOptions {
    pub max_num_paths: usize,
    pub max_path_length: usize,
    pub match_relative_paths: bool,
    pub match_case_insensitive: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        ExtractorOptions {
            max_num_paths: 64,
            max_path_length: 16,
            match_relative_paths: false,
            match_case_insensitive: false,
        }
    }
}

/// Holds a fixed set of paths and runs the bitmap-driven matching algorithm
/// over a document.
pub struct Extractor {
    options: ExtractorOptions,
    paths: Vec<Path>,
}

impl Extractor {
    pub fn new(options: ExtractorOptions) -> Extractor {
        Extractor {
            options,
            paths: Vec::new(),
        }
    }

    /// Registers a complete path, assigning it the next path id. Fails if
    /// the path is incomplete, exceeds `max_path_length`, or the extractor
    /// already holds `max_num_paths` paths.
    pub fn add_path(&mut self, mut path: Path) -> Result<usize> {
        if !path.is_complete() {
            return Err(IonError::InvalidState("path is incomplete"));
        }
        if path.components.len() > self.options.max_path_length {
            return Err(IonError::InvalidArg("path exceeds the extractor's max_path_length"));
        }
        if self.paths.len() >= self.options.max_num_paths {
            return Err(IonError::InvalidArg("extractor already holds max_num_paths paths"));
        }
        let id = self.paths.len();
        path.set_id(id);
        self.paths.push(path);
        Ok(id)
    }

    fn field_matches(&self, component_text: &str, field: Option<&Symbol>) -> bool {
        let Some(text) = field.and_then(Symbol::text) else {
            return false;
        };
        if self.options.match_case_insensitive {
            component_text.eq_ignore_ascii_case(text)
        } else {
            component_text == text
        }
    }

    fn component_matches(&self, component: &PathComponent, field: Option<&Symbol>, ordinal: i64) -> bool {
        match component {
            PathComponent::Field(text) => self.field_matches(text, field),
            PathComponent::Ordinal(index) => *index == ordinal,
            PathComponent::Wildcard => true,
        }
    }

    fn validate_step_out(&self, k: usize, depth: usize) -> Result<()> {
        if k == 0 || k > depth {
            Err(IonError::InvalidState("step-out count exceeds the callback's firing depth"))
        } else {
            Ok(())
        }
    }

    /// Runs the match over every value reachable at and below the reader's
    /// current position. In absolute mode the reader must already be at
    /// depth 0; in relative mode, whatever depth it is at becomes the
    /// extractor's root. A zero-length path fires directly on each value at
    /// the root; every other path's first component is tested one level
    /// down, against the children of a root value that is itself a
    /// container.
    pub fn match_document(&self, reader: &mut dyn Reader) -> Result<()> {
        if !self.options.match_relative_paths && reader.depth() != 0 {
            return Err(IonError::InvalidState(
                "absolute-mode extractor must start matching at reader depth 0",
            ));
        }
        let mut root_active = Bitmap::new(self.paths.len());
        for (i, path) in self.paths.iter().enumerate() {
            if !path.is_depth_zero() {
                root_active.set(i);
            }
        }
        loop {
            let ty = match reader.next()? {
                Some(ty) => ty,
                None => return Ok(()),
            };
            for path in self.paths.iter().filter(|p| p.is_depth_zero()) {
                let mut control = Control::Next;
                path.invoke(reader, &mut control)?;
                if let Control::StepOut(k) = control {
                    // nothing encloses a root value, so any requested step-out is
                    // out of range by construction.
                    self.validate_step_out(k, 0)?;
                }
            }
            if ty.is_container() && !root_active.is_empty() {
                reader.step_in()?;
                let pending = self.match_level(reader, &root_active, 1)?;
                reader.step_out()?;
                if pending > 0 {
                    return Ok(());
                }
            }
        }
    }

    /// Matches every sibling at nesting level `depth` (1 for the direct
    /// children of a root container), recursing into containers whose
    /// `current_active` bitmap after evaluation is non-empty. `depth - 1` is
    /// the index into each active path's component list. Returns the number
    /// of additional parent levels that still need to abort their own
    /// sibling loop after a `StepOut` control.
    fn match_level(&self, reader: &mut dyn Reader, previous_active: &Bitmap, depth: usize) -> Result<usize> {
        let mut ordinal: i64 = 0;
        loop {
            let ty = match reader.next()? {
                Some(ty) => ty,
                None => return Ok(0),
            };
            let field = reader.field_name_symbol();
            let mut current_active = Bitmap::new(self.paths.len());
            let mut trigger: Option<usize> = None;

            for i in previous_active.iter_set() {
                let path = &self.paths[i];
                let component_index = depth - 1;
                if component_index >= path.components.len() {
                    continue;
                }
                if !self.component_matches(&path.components[component_index], field.as_ref(), ordinal) {
                    continue;
                }
                if path.is_terminal[component_index] {
                    let mut control = Control::Next;
                    path.invoke(reader, &mut control)?;
                    if let Control::StepOut(k) = control {
                        self.validate_step_out(k, depth)?;
                        trigger = Some(trigger.map_or(k, |existing| existing.max(k)));
                    }
                } else {
                    current_active.set(i);
                }
            }

            if ty.is_container() && !current_active.is_empty() {
                reader.step_in()?;
                let pending = self.match_level(reader, &current_active, depth + 1)?;
                reader.step_out()?;
                if pending > 0 {
                    trigger = Some(trigger.map_or(pending, |existing| existing.max(pending)));
                }
            }

            match trigger {
                Some(x) => return Ok(x - 1),
                None => ordinal += 1,
            }
        }
    }
}
