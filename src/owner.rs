//! In-process owner backed by a chunked text document.
//!
//! On disk a document is plain text. Blank lines separate chunks and an optional first line
//! `# note` carries the chunk's note:
//!
//! ```text
//! # intro
//! first line
//! second line
//!
//! third line
//! ```
//!
//! Content lines cannot be blank on disk: an emptied line splits its chunk on the next load.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::intent::{Intent, Owner};
use crate::model::{GridMode, LineRange};
use crate::surface::{CellAttrs, RenderedGrid};

pub const COLUMNS: [&str; 3] = ["line", "content", "note"];
const CONTENT_COL: usize = 1;
const NOTE_COL: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Chunk {
    id: u64,
    note: String,
    lines: Vec<String>,
}

impl Chunk {
    fn key(&self) -> String {
        format!("chunk-{}", self.id)
    }
}

pub struct DocumentOwner {
    chunks: Vec<Chunk>,
    next_id: u64,
    mode: GridMode,
    /// Cell with a mounted edit affordance, as `(row, col)`.
    editing: Option<(usize, usize)>,
    selection: Option<LineRange>,
    latest_line: Option<usize>,
    /// A render is owed to the grid.
    pub dirty: bool,
    /// Content differs from what was last read or written.
    pub modified: bool,
    path: Option<PathBuf>,
    last_synced: String,
}

impl DocumentOwner {
    pub fn from_text(text: &str, mode: GridMode) -> Self {
        let mut owner = Self {
            chunks: Vec::new(),
            next_id: 0,
            mode,
            editing: None,
            selection: None,
            latest_line: None,
            dirty: true,
            modified: false,
            path: None,
            last_synced: text.to_string(),
        };
        owner.chunks = owner.parse(text);
        owner
    }

    /// Load `path`, or start an empty document there if it does not exist yet.
    pub fn load(path: &Path, mode: GridMode) -> Result<Self> {
        let text = if path.exists() {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        } else {
            String::new()
        };
        let mut owner = Self::from_text(&text, mode);
        owner.path = Some(path.to_path_buf());
        Ok(owner)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn mode(&self) -> GridMode {
        self.mode
    }

    pub fn line_count(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.lines.len()).sum()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.chunks
            .iter()
            .flat_map(|chunk| chunk.lines.iter().map(String::as_str))
    }

    /// Line counts per chunk, in order.
    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.chunks.iter().map(|chunk| chunk.lines.len()).collect()
    }

    pub fn selection(&self) -> Option<LineRange> {
        self.selection
    }

    pub fn editing(&self) -> Option<(usize, usize)> {
        self.editing
    }

    /// Re-read the file after an external change. Returns whether the content changed.
    pub fn reload(&mut self) -> Result<bool> {
        let Some(path) = self.path.clone() else {
            return Ok(false);
        };
        let text = if path.exists() {
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?
        } else {
            String::new()
        };
        if text == self.last_synced {
            return Ok(false);
        }

        tracing::info!(path = %path.display(), "document changed on disk, reloading");
        self.chunks = self.parse(&text);
        self.last_synced = text;
        self.editing = None;
        self.selection = None;
        self.modified = false;
        self.dirty = true;
        Ok(true)
    }

    /// Write the document back through a temp file.
    pub fn save(&mut self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        let text = self.to_text();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        let file = fs::File::create(&tmp)?;
        let mut writer = std::io::BufWriter::new(file);
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        fs::rename(&tmp, &path)?;

        tracing::info!(path = %path.display(), "document saved");
        self.last_synced = text;
        self.modified = false;
        Ok(())
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (idx, chunk) in self.chunks.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            if !chunk.note.is_empty() {
                out.push_str("# ");
                out.push_str(&chunk.note);
                out.push('\n');
            }
            for line in &chunk.lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }

    /// Replace the grid with the current document.
    pub fn render_into(&mut self, grid: &mut RenderedGrid) {
        grid.reset(self.mode, COLUMNS);

        let mut line = 0;
        for chunk in &self.chunks {
            let key = chunk.key();
            for (idx, text) in chunk.lines.iter().enumerate() {
                let note = if idx == 0 {
                    CellAttrs::text(chunk.note.clone())
                        .editable()
                        .bound_to(key.clone(), "note")
                } else {
                    CellAttrs::text("")
                };
                grid.push_row([
                    CellAttrs::line_number(line),
                    CellAttrs::text(text.clone())
                        .editable()
                        .deletable()
                        .bound_to(key.clone(), "content"),
                    note,
                ]);
                line += 1;
            }
        }

        if let Some((row, col)) = self.editing {
            let value = self.cell_value(row, col).unwrap_or_default();
            if grid.mount_affordance(row, col, &value).is_none() {
                self.editing = None;
            }
        }
        grid.set_latest_line(self.latest_line.take());
        self.dirty = false;
    }

    // ── Intents ──────────────────────────────────────────────────

    fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::StartEdit {
                row_index,
                col_index,
            } => {
                if self.cell_value(row_index, col_index).is_some() {
                    self.editing = Some((row_index, col_index));
                    self.dirty = true;
                }
            }
            Intent::UpdateCell {
                chunk_id,
                col_name,
                value,
            } => {
                self.update_cell(&chunk_id, &col_name, &value);
                self.editing = None;
                self.dirty = true;
            }
            Intent::CancelEdit => {
                self.editing = None;
                self.dirty = true;
            }
            Intent::DeleteLine => {
                if let Some((row, _)) = self.editing.take() {
                    self.delete_line(row);
                }
                self.dirty = true;
            }
            Intent::StartSelection(range) | Intent::UpdateSelection(range) => {
                self.selection = Some(range);
            }
            Intent::CancelSelection => self.selection = None,
            Intent::Rechunk(range) => {
                if let Some(range) = range.or(self.selection) {
                    self.rechunk(range);
                }
                self.selection = None;
                self.dirty = true;
            }
            Intent::CellFocused { .. }
            | Intent::CellActivated { .. }
            | Intent::TextSelected { .. } => {}
        }
    }

    fn update_cell(&mut self, chunk_id: &str, col_name: &str, value: &str) {
        let Some(ci) = self.chunks.iter().position(|chunk| chunk.key() == chunk_id) else {
            tracing::warn!(chunk_id, "update for unknown chunk");
            return;
        };

        match col_name {
            "note" => {
                self.chunks[ci].note = value.lines().next().unwrap_or_default().trim().to_string();
                self.latest_line = Some(self.first_line_of(ci));
            }
            "content" => {
                let Some((row, _)) = self.editing else {
                    return;
                };
                let Some((owner_ci, li)) = self.locate(row) else {
                    return;
                };
                if owner_ci != ci {
                    tracing::warn!(chunk_id, row, "edited row is not in the named chunk");
                    return;
                }
                let replacement: Vec<String> = value.split('\n').map(str::to_string).collect();
                self.chunks[ci].lines.splice(li..=li, replacement);
                self.latest_line = Some(row);
            }
            other => {
                tracing::warn!(col_name = other, "update for unknown column");
                return;
            }
        }
        self.modified = true;
    }

    fn delete_line(&mut self, row: usize) {
        let Some((ci, li)) = self.locate(row) else {
            return;
        };
        self.chunks[ci].lines.remove(li);
        if self.chunks[ci].lines.is_empty() {
            self.chunks.remove(ci);
        }
        self.latest_line = Some(row.saturating_sub(1));
        self.modified = true;
    }

    /// Make the lines of `range` a chunk of their own.
    fn rechunk(&mut self, range: LineRange) {
        let total = self.line_count();
        if total == 0 {
            return;
        }
        let (low, high) = range.normalized();
        let high = high.min(total - 1);
        if low > high {
            return;
        }

        // chunk start line -> (id, note)
        let mut starts: BTreeMap<usize, (u64, String)> = BTreeMap::new();
        let mut line = 0;
        for chunk in &self.chunks {
            starts.insert(line, (chunk.id, chunk.note.clone()));
            line += chunk.lines.len();
        }

        starts.retain(|start, _| *start <= low || *start > high);
        if !starts.contains_key(&low) {
            starts.insert(low, (self.fresh_id(), String::new()));
        }
        if high + 1 < total && !starts.contains_key(&(high + 1)) {
            starts.insert(high + 1, (self.fresh_id(), String::new()));
        }

        let lines: Vec<String> = self.lines().map(str::to_string).collect();
        let bounds: Vec<usize> = starts.keys().copied().chain([total]).collect();
        self.chunks = starts
            .into_values()
            .zip(bounds.windows(2))
            .map(|((id, note), span)| Chunk {
                id,
                note,
                lines: lines[span[0]..span[1]].to_vec(),
            })
            .collect();

        tracing::debug!(low, high, chunks = self.chunks.len(), "rechunked");
        self.latest_line = Some(low);
        self.modified = true;
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn parse(&mut self, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut note = String::new();
        let mut lines: Vec<String> = Vec::new();

        for raw in text.lines() {
            if raw.trim().is_empty() {
                if !lines.is_empty() {
                    chunks.push(self.chunk(std::mem::take(&mut note), std::mem::take(&mut lines)));
                }
                continue;
            }
            if lines.is_empty()
                && note.is_empty()
                && let Some(heading) = raw.strip_prefix("# ")
            {
                note = heading.trim().to_string();
                continue;
            }
            lines.push(raw.to_string());
        }
        if !lines.is_empty() || !note.is_empty() {
            if lines.is_empty() {
                lines.push(String::new());
            }
            chunks.push(self.chunk(note, lines));
        }
        if chunks.is_empty() {
            chunks.push(self.chunk(String::new(), vec![String::new()]));
        }
        chunks
    }

    fn chunk(&mut self, note: String, lines: Vec<String>) -> Chunk {
        Chunk {
            id: self.fresh_id(),
            note,
            lines,
        }
    }

    fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Chunk index and line-within-chunk for a document line.
    fn locate(&self, row: usize) -> Option<(usize, usize)> {
        let mut start = 0;
        for (ci, chunk) in self.chunks.iter().enumerate() {
            if row < start + chunk.lines.len() {
                return Some((ci, row - start));
            }
            start += chunk.lines.len();
        }
        None
    }

    fn first_line_of(&self, ci: usize) -> usize {
        self.chunks[..ci].iter().map(|chunk| chunk.lines.len()).sum()
    }

    fn cell_value(&self, row: usize, col: usize) -> Option<String> {
        let (ci, li) = self.locate(row)?;
        let chunk = &self.chunks[ci];
        match col {
            CONTENT_COL => chunk.lines.get(li).cloned(),
            NOTE_COL if li == 0 => Some(chunk.note.clone()),
            _ => None,
        }
    }
}

impl Owner for DocumentOwner {
    fn push_event(&mut self, intent: Intent) {
        tracing::debug!(name = intent.name(), payload = %intent.payload(), "intent");
        self.apply(intent);
    }
}
