// Line-oriented input decoding for the host terminal.
//
//   down <key>        key pressed (repeats while held)
//   up <key>          key released
//   press <button>    mouse button pressed (left | middle | right | 0..2)
//   release <button>  mouse button released
//   move <x> <y>      pointer moved, arena coordinates

use crate::use_cases::{InputEvent, MouseButton};
use glam::Vec2;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseInputError {
    Empty,
    UnknownCommand(String),
    MissingArgument(&'static str),
    InvalidButton(String),
    InvalidCoordinate(String),
    TrailingInput(String),
}

impl fmt::Display for ParseInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseInputError::Empty => write!(f, "empty input line"),
            ParseInputError::UnknownCommand(command) => write!(f, "unknown command: {command}"),
            ParseInputError::MissingArgument(name) => write!(f, "missing argument: {name}"),
            ParseInputError::InvalidButton(button) => write!(f, "invalid mouse button: {button}"),
            ParseInputError::InvalidCoordinate(value) => write!(f, "invalid coordinate: {value}"),
            ParseInputError::TrailingInput(rest) => write!(f, "unexpected trailing input: {rest}"),
        }
    }
}

impl std::error::Error for ParseInputError {}

pub fn parse_input_line(line: &str) -> Result<InputEvent, ParseInputError> {
    let mut words = line.split_whitespace();
    let command = words.next().ok_or(ParseInputError::Empty)?;

    let event = match command {
        "down" => InputEvent::KeyDown(key(words.next())?),
        "up" => InputEvent::KeyUp(key(words.next())?),
        "press" => InputEvent::MouseDown(button(words.next())?),
        "release" => InputEvent::MouseUp(button(words.next())?),
        "move" => {
            let x = coordinate(words.next(), "x")?;
            let y = coordinate(words.next(), "y")?;
            InputEvent::MouseMove(Vec2::new(x, y))
        }
        other => return Err(ParseInputError::UnknownCommand(other.to_string())),
    };

    let rest: Vec<&str> = words.collect();
    if !rest.is_empty() {
        return Err(ParseInputError::TrailingInput(rest.join(" ")));
    }
    Ok(event)
}

fn key(word: Option<&str>) -> Result<String, ParseInputError> {
    word.map(str::to_string)
        .ok_or(ParseInputError::MissingArgument("key"))
}

fn button(word: Option<&str>) -> Result<MouseButton, ParseInputError> {
    let word = word.ok_or(ParseInputError::MissingArgument("button"))?;
    let parsed = match word {
        "left" => Some(MouseButton::Left),
        "middle" => Some(MouseButton::Middle),
        "right" => Some(MouseButton::Right),
        code => code.parse::<u8>().ok().and_then(MouseButton::from_code),
    };
    parsed.ok_or_else(|| ParseInputError::InvalidButton(word.to_string()))
}

fn coordinate(word: Option<&str>, name: &'static str) -> Result<f32, ParseInputError> {
    let word = word.ok_or(ParseInputError::MissingArgument(name))?;
    word.parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ParseInputError::InvalidCoordinate(word.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_key_line_is_parsed_then_key_is_kept_verbatim() {
        assert_eq!(
            parse_input_line("down w").expect("valid line"),
            InputEvent::KeyDown("w".to_string())
        );
        assert_eq!(
            parse_input_line("  up   ArrowUp ").expect("valid line"),
            InputEvent::KeyUp("ArrowUp".to_string())
        );
    }

    #[test]
    fn when_button_is_named_or_numbered_then_both_decode() {
        assert_eq!(
            parse_input_line("press left").expect("valid line"),
            InputEvent::MouseDown(MouseButton::Left)
        );
        assert_eq!(
            parse_input_line("release 2").expect("valid line"),
            InputEvent::MouseUp(MouseButton::Right)
        );
    }

    #[test]
    fn when_move_line_is_parsed_then_pointer_position_is_returned() {
        assert_eq!(
            parse_input_line("move 412.5 -3").expect("valid line"),
            InputEvent::MouseMove(Vec2::new(412.5, -3.0))
        );
    }

    #[test]
    fn when_line_is_malformed_then_error_names_the_problem() {
        assert_eq!(parse_input_line("   "), Err(ParseInputError::Empty));
        assert_eq!(
            parse_input_line("jump"),
            Err(ParseInputError::UnknownCommand("jump".to_string()))
        );
        assert_eq!(
            parse_input_line("down"),
            Err(ParseInputError::MissingArgument("key"))
        );
        assert_eq!(
            parse_input_line("press 9"),
            Err(ParseInputError::InvalidButton("9".to_string()))
        );
        assert_eq!(
            parse_input_line("move 1 nan"),
            Err(ParseInputError::InvalidCoordinate("nan".to_string()))
        );
        assert_eq!(
            parse_input_line("up w now"),
            Err(ParseInputError::TrailingInput("now".to_string()))
        );
    }
}
