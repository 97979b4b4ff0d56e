//! Four-function calculator.
//!
//! Operators are applied strictly left to right (`2+3*4` is 20), with no
//! precedence. Each page gets a fresh [`CalcState`]; nothing carries over
//! between visits.

use std::cell::RefCell;
use std::rc::Rc;

use titan_core::error::Result;
use titan_core::geometry::Rect;
use titan_core::{App, AppModule, Shell, SurfaceId, Widget};

use crate::page;

const KEYS: [char; 17] = [
    '7', '8', '9', '/', '4', '5', '6', '*', '1', '2', '3', '-', '0', '.', '=', '+', 'C',
];
const GRID: Rect = Rect::new(15, 44, 270, 188);
const COLUMNS: i32 = 4;
const ROWS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    fn from_key(key: char) -> Option<Self> {
        match key {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            _ => None,
        }
    }

    /// `None` on division by zero.
    fn apply(self, lhs: f64, rhs: f64) -> Option<f64> {
        match self {
            Self::Add => Some(lhs + rhs),
            Self::Sub => Some(lhs - rhs),
            Self::Mul => Some(lhs * rhs),
            Self::Div if rhs == 0.0 => None,
            Self::Div => Some(lhs / rhs),
        }
    }
}

/// Render a result, dropping the fraction of whole numbers.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// Keypad state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct CalcState {
    input: String,
    first: Option<f64>,
    op: Option<Op>,
    display: String,
}

impl Default for CalcState {
    fn default() -> Self {
        Self {
            input: "0".to_string(),
            first: None,
            op: None,
            display: "0".to_string(),
        }
    }
}

impl CalcState {
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Feed one key. Unknown keys are ignored.
    pub fn press(&mut self, key: char) {
        match key {
            '=' => self.equals(),
            'C' => *self = Self::default(),
            '0'..='9' | '.' => self.digit(key),
            _ => {
                if let Some(op) = Op::from_key(key) {
                    self.operator(op);
                }
            },
        }
    }

    /// Delete the last typed character. Returns false when there was nothing
    /// to delete.
    pub fn backspace(&mut self) -> bool {
        if self.input == "0" {
            return false;
        }
        self.input.pop();
        if self.input.is_empty() || self.input == "-" {
            self.input = "0".to_string();
        }
        self.display = self.input.clone();
        true
    }

    fn digit(&mut self, key: char) {
        if key == '.' && self.input.contains('.') {
            return;
        }
        if self.input == "0" && key != '.' {
            self.input = key.to_string();
        } else {
            self.input.push(key);
        }
        self.display = self.input.clone();
    }

    fn operator(&mut self, op: Op) {
        match (self.first, self.op) {
            (Some(_), Some(_)) => {
                let Some(result) = self.evaluate() else {
                    return;
                };
                self.first = Some(result);
            },
            _ => self.first = Some(self.input_value()),
        }
        self.op = Some(op);
        self.input = "0".to_string();
    }

    fn equals(&mut self) {
        if self.first.is_some() && self.op.is_some() && self.evaluate().is_some() {
            self.input = "0".to_string();
            self.first = None;
            self.op = None;
        }
    }

    /// Apply the pending operator and show the result. On division by zero
    /// the state resets and the display reads "Error".
    fn evaluate(&mut self) -> Option<f64> {
        let (first, op) = (self.first?, self.op?);
        match op.apply(first, self.input_value()) {
            Some(result) => {
                self.display = format_number(result);
                Some(result)
            },
            None => {
                log::debug!("Calculator division by zero");
                *self = Self::default();
                self.display = "Error".to_string();
                None
            },
        }
    }

    fn input_value(&self) -> f64 {
        self.input.parse().unwrap_or(0.0)
    }
}

/// Rect of key `i` in the keypad grid; `C` spans the last row.
fn key_rect(i: usize) -> Rect {
    let (row, col, span) = if i == KEYS.len() - 1 {
        (ROWS - 1, 0, COLUMNS)
    } else {
        let i = i as i32;
        (i / COLUMNS, i % COLUMNS, 1)
    };
    let w = GRID.w as i32;
    let h = GRID.h as i32;
    let x0 = GRID.x + col * w / COLUMNS;
    let x1 = GRID.x + (col + span) * w / COLUMNS;
    let y0 = GRID.y + row * h / ROWS;
    let y1 = GRID.y + (row + 1) * h / ROWS;
    Rect::new(x0 + 1, y0 + 1, (x1 - x0 - 2) as u32, (y1 - y0 - 2) as u32)
}

pub struct CalculatorModule;

impl AppModule for CalculatorModule {
    fn instantiate(&self) -> Box<dyn App> {
        Box::new(CalculatorApp {
            state: Rc::new(RefCell::new(CalcState::default())),
        })
    }
}

struct CalculatorApp {
    state: Rc<RefCell<CalcState>>,
}

impl App for CalculatorApp {
    fn create(&mut self, surface: SurfaceId, shell: &mut Shell) -> Result<()> {
        let ui = shell.config.ui.clone();
        let s = page(shell, surface)?;
        s.configure_background(ui.background);
        s.add(
            Widget::label("display", Rect::new(15, 6, 270, 38), self.state.borrow().display())
                .with_fg(ui.primary)
                .with_font_size(20),
        );
        for (i, key) in KEYS.iter().copied().enumerate() {
            let state = Rc::clone(&self.state);
            let fg = if key.is_ascii_digit() || key == '.' {
                ui.primary
            } else {
                ui.secondary
            };
            s.add(
                Widget::button(
                    &format!("key_{key}"),
                    key_rect(i),
                    &key.to_string(),
                    move |shell: &mut Shell| {
                        state.borrow_mut().press(key);
                        show(shell, surface, &state.borrow());
                    },
                )
                .with_fg(fg)
                .with_bg(ui.background)
                .with_font_size(16),
            );
        }
        Ok(())
    }

    fn on_back(&mut self, surface: SurfaceId, shell: &mut Shell) -> Result<bool> {
        let deleted = self.state.borrow_mut().backspace();
        if deleted {
            show(shell, surface, &self.state.borrow());
        }
        Ok(deleted)
    }
}

fn show(shell: &mut Shell, surface: SurfaceId, state: &CalcState) {
    if let Some(s) = shell.surfaces.get_mut(surface) {
        s.set_text("display", state.display());
    }
}
