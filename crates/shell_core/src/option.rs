use shared::error::ShellError;

pub const DEFAULT_OPTION_COUNT: u32 = 3;

/// Render mode counter in `[0, bound)`, advanced by double taps.
///
/// Lives on the dispatch thread only; the value reaches the render thread
/// through `RenderSurface::set_render_option`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCycler {
    value: u32,
    bound: u32,
}

impl OptionCycler {
    pub fn new(bound: u32) -> Result<Self, ShellError> {
        if bound == 0 {
            return Err(ShellError::InvalidOptionBound(bound));
        }
        Ok(Self { value: 0, bound })
    }

    pub fn advance(&mut self) -> u32 {
        self.value += 1;
        if self.value >= self.bound {
            self.value = 0;
        }
        self.value
    }

    pub fn current(&self) -> u32 {
        self.value
    }
}

impl Default for OptionCycler {
    fn default() -> Self {
        Self {
            value: 0,
            bound: DEFAULT_OPTION_COUNT,
        }
    }
}
