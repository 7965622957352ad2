//! The graphics state: a mutable record the content-stream interpreter
//! threads through execution, saved/restored by `q`/`Q`. Scoped to what
//! text/image extraction needs; full color-managed compositing,
//! blend-mode, and halftone machinery are out of scope here.

use crate::object::Dictionary;

pub type Matrix = [f64; 6];

pub const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `a*c + b*e`-style 2D affine composition: applies `lhs` then `rhs`
/// (i.e. `rhs` is the new, outer transform), matching the PDF convention
/// that `cm` premultiplies the CTM by the given matrix.
pub fn concat(lhs: Matrix, rhs: Matrix) -> Matrix {
    [
        lhs[0] * rhs[0] + lhs[1] * rhs[2],
        lhs[0] * rhs[1] + lhs[1] * rhs[3],
        lhs[2] * rhs[0] + lhs[3] * rhs[2],
        lhs[2] * rhs[1] + lhs[3] * rhs[3],
        lhs[4] * rhs[0] + lhs[5] * rhs[2] + rhs[4],
        lhs[4] * rhs[1] + lhs[5] * rhs[3] + rhs[5],
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorSpaceKind {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
    /// Any other named color space (ICCBased, Indexed, Separation, ...):
    /// carried by name only, since this engine never paints pixels.
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorState {
    pub space: ColorSpaceKind,
    pub components: Vec<f64>,
}

impl Default for ColorState {
    fn default() -> Self {
        ColorState {
            space: ColorSpaceKind::DeviceGray,
            components: vec![0.0],
        }
    }
}

/// Text state: font, font size, char/word spacing, leading, horizontal
/// scaling, rise, rendering mode, text matrix, line matrix.
#[derive(Debug, Clone)]
pub struct TextState {
    pub font_resource_name: Option<String>,
    pub font_size: f64,
    pub char_spacing: f64,
    pub word_spacing: f64,
    pub leading: f64,
    pub horizontal_scaling: f64,
    pub rise: f64,
    pub render_mode: i64,
    pub text_matrix: Matrix,
    pub line_matrix: Matrix,
}

impl Default for TextState {
    fn default() -> Self {
        TextState {
            font_resource_name: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            leading: 0.0,
            horizontal_scaling: 100.0,
            rise: 0.0,
            render_mode: 0,
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LineParams {
    pub width: f64,
    pub cap: i64,
    pub join: i64,
    pub miter_limit: f64,
    pub dash_pattern: Vec<f64>,
    pub dash_phase: f64,
}

/// One entry of the `q`/`Q` stack.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    pub ctm: Matrix,
    pub text: TextState,
    pub stroke_color: ColorState,
    pub nonstroke_color: ColorState,
    pub line: LineParams,
    /// The clip path, tracked only as "has a clip been set" rather than
    /// the actual path geometry: this engine never rasterizes, so exact
    /// clip geometry would only matter to a pixel renderer, which is out
    /// of scope here.
    pub has_clip: bool,
    pub resources: Dictionary,
}

impl GraphicsState {
    pub fn new(resources: Dictionary) -> Self {
        GraphicsState {
            ctm: IDENTITY,
            text: TextState::default(),
            stroke_color: ColorState::default(),
            nonstroke_color: ColorState::default(),
            line: LineParams::default(),
            has_clip: false,
            resources,
        }
    }
}

/// The `q`/`Q` stack plus the state currently in effect.
#[derive(Debug, Clone)]
pub struct GraphicsStateStack {
    current: GraphicsState,
    saved: Vec<GraphicsState>,
}

impl GraphicsStateStack {
    pub fn new(resources: Dictionary) -> Self {
        GraphicsStateStack {
            current: GraphicsState::new(resources),
            saved: Vec::new(),
        }
    }

    pub fn current(&self) -> &GraphicsState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut GraphicsState {
        &mut self.current
    }

    pub fn push(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// Restores the most recently saved state. Returns `false` if the
    /// stack was empty (`Q` with no matching `q`), in which case the
    /// current state is left unchanged and the caller should record
    /// [`crate::error::Warning::UnbalancedGraphicsState`].
    pub fn pop(&mut self) -> bool {
        match self.saved.pop() {
            Some(state) => {
                self.current = state;
                true
            }
            None => false,
        }
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_with_identity_is_identity() {
        let m = [2.0, 0.0, 0.0, 2.0, 5.0, 5.0];
        assert_eq!(concat(m, IDENTITY), m);
        assert_eq!(concat(IDENTITY, m), m);
    }

    #[test]
    fn push_pop_restores_prior_state() {
        let mut stack = GraphicsStateStack::new(Dictionary::new());
        stack.push();
        stack.current_mut().line.width = 5.0;
        assert!(stack.pop());
        assert_eq!(stack.current().line.width, 0.0);
    }

    #[test]
    fn pop_without_push_reports_unbalanced() {
        let mut stack = GraphicsStateStack::new(Dictionary::new());
        assert!(!stack.pop());
    }
}
