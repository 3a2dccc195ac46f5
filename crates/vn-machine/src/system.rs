//! Rendering, audio and text collaborators.
//!
//! The machine never draws or plays anything itself; handlers and suspended
//! operations call through these traits. The headless implementations keep
//! their state behind shared handles so callers can inspect it while the
//! machine owns the boxed trait objects.

use itertools::Itertools;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use vn_core::{Point, Rect, Result};

pub trait TextPage {
    /// Show one character. Returns `false`, without showing it, when the
    /// page has no room left.
    fn display_char(&mut self, ch: char) -> Result<bool>;
    fn hard_break(&mut self) -> Result<()>;
    fn new_page(&mut self) -> Result<()>;
    fn is_full(&self) -> bool;
}

/// Opaque view of whatever is currently playing.
pub trait SoundStatus {
    fn bgm_playing(&self) -> bool;
    fn wav_playing(&self, channel: i32) -> bool;
}

pub trait Graphics {
    fn fill_rect(&mut self, rect: Rect, color: i32) -> Result<()>;
    fn move_object(&mut self, object: i32, position: Point) -> Result<()>;
}

pub struct Collaborators {
    pub text: Box<dyn TextPage>,
    pub sound: Box<dyn SoundStatus>,
    pub graphics: Box<dyn Graphics>,
}

impl Collaborators {
    pub fn new(
        text: impl TextPage + 'static,
        sound: impl SoundStatus + 'static,
        graphics: impl Graphics + 'static,
    ) -> Self {
        Self {
            text: Box::new(text),
            sound: Box::new(sound),
            graphics: Box::new(graphics),
        }
    }
}

#[derive(Debug, Default)]
struct TextState {
    columns: usize,
    rows: usize,
    lines: Vec<String>,
    overflow: bool,
    pages: Vec<String>,
}

impl TextState {
    fn current_width(&self) -> usize {
        self.lines.last().map_or(0, |line| line.chars().count())
    }

    fn is_full(&self) -> bool {
        self.lines.len() >= self.rows && (self.overflow || self.current_width() >= self.columns)
    }
}

/// Fixed-size character grid that keeps every finished page.
#[derive(Debug, Clone)]
pub struct HeadlessText {
    state: Rc<RefCell<TextState>>,
}

impl HeadlessText {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            state: Rc::new(RefCell::new(TextState {
                columns: columns.max(1),
                rows: rows.max(1),
                lines: vec![String::new()],
                ..TextState::default()
            })),
        }
    }

    /// Text on the current page, one line per row.
    pub fn page(&self) -> String {
        self.state.borrow().lines.join("\n")
    }

    /// Pages cleared so far, oldest first.
    pub fn pages(&self) -> Vec<String> {
        self.state.borrow().pages.clone()
    }

    pub fn transcript(&self) -> String {
        let state = self.state.borrow();
        let current = state.lines.join("\n");
        let transcript = state
            .pages
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(current.as_str()))
            .join("\n--\n");
        transcript
    }
}

impl TextPage for HeadlessText {
    fn display_char(&mut self, ch: char) -> Result<bool> {
        let mut state = self.state.borrow_mut();
        if state.is_full() {
            return Ok(false);
        }
        if state.current_width() >= state.columns {
            state.lines.push(String::new());
        }
        if let Some(line) = state.lines.last_mut() {
            line.push(ch);
        }
        Ok(true)
    }

    fn hard_break(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.lines.len() >= state.rows {
            state.overflow = true;
        } else {
            state.lines.push(String::new());
        }
        Ok(())
    }

    fn new_page(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let finished = std::mem::replace(&mut state.lines, vec![String::new()]).join("\n");
        state.pages.push(finished);
        state.overflow = false;
        Ok(())
    }

    fn is_full(&self) -> bool {
        self.state.borrow().is_full()
    }
}

#[derive(Debug, Default)]
struct SoundState {
    bgm: bool,
    wav: BTreeSet<i32>,
}

/// Playback flags set by the embedding application.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSound {
    state: Rc<RefCell<SoundState>>,
}

impl HeadlessSound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bgm_playing(&self, playing: bool) {
        self.state.borrow_mut().bgm = playing;
    }

    pub fn set_wav_playing(&self, channel: i32, playing: bool) {
        let mut state = self.state.borrow_mut();
        if playing {
            state.wav.insert(channel);
        } else {
            state.wav.remove(&channel);
        }
    }
}

impl SoundStatus for HeadlessSound {
    fn bgm_playing(&self) -> bool {
        self.state.borrow().bgm
    }

    fn wav_playing(&self, channel: i32) -> bool {
        self.state.borrow().wav.contains(&channel)
    }
}

/// Records every draw request as a line of text.
#[derive(Debug, Clone, Default)]
pub struct HeadlessGraphics {
    log: Rc<RefCell<Vec<String>>>,
}

impl HeadlessGraphics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl Graphics for HeadlessGraphics {
    fn fill_rect(&mut self, rect: Rect, color: i32) -> Result<()> {
        if rect.is_empty() {
            return Err(vn_core::Error::collaborator(format!(
                "cannot fill empty rectangle {}",
                rect
            )));
        }
        self.log
            .borrow_mut()
            .push(format!("fill_rect {} color {}", rect, color));
        Ok(())
    }

    fn move_object(&mut self, object: i32, position: Point) -> Result<()> {
        self.log
            .borrow_mut()
            .push(format!("move_object {} to {}", object, position));
        Ok(())
    }
}

/// Handles onto one set of headless collaborators.
#[derive(Debug, Clone)]
pub struct Headless {
    pub text: HeadlessText,
    pub sound: HeadlessSound,
    pub graphics: HeadlessGraphics,
}

impl Headless {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            text: HeadlessText::new(columns, rows),
            sound: HeadlessSound::new(),
            graphics: HeadlessGraphics::new(),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            self.text.clone(),
            self.sound.clone(),
            self.graphics.clone(),
        )
    }
}
