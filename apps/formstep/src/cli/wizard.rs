//! # Terminal Wizard
//!
//! Line-oriented rendition of the wizard for `formstep apply` / `formstep edit`.
//!
//! Each step prints its fields with their current values and prompts for
//! each one (Enter keeps the value, `-` clears it), then asks for an action.
//! The reader and writer are generic so scripted input drives the same loop
//! as a terminal. End of input cancels without saving.

use formstep_core::{
    ActingUser, Action, NavigationOutcome, Record, RecordStore, StepId, Submission,
    SubmissionResult, WizardController, WizardError, WizardSessionState, WizardSurface,
};
use std::io::{BufRead, Write};

/// Input that clears a field.
const CLEAR_MARKER: &str = "-";

/// How a terminal session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardExit {
    Submitted(SubmissionResult),
    Cancelled,
}

fn io_err(e: std::io::Error) -> WizardError {
    WizardError::Io(format!("Terminal I/O failed: {}", e))
}

/// Read one line without its terminator. `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>, WizardError> {
    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(io_err)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn step_title(step: StepId) -> &'static str {
    match step {
        StepId::PersonalDetails => "Personal Details",
        StepId::ContactDetails => "Contact Details",
        StepId::Review => "Review",
    }
}

// =============================================================================
// RENDERING
// =============================================================================

fn render<W: Write>(surface: &WizardSurface, output: &mut W) -> Result<(), WizardError> {
    let position = StepId::ALL
        .iter()
        .position(|s| *s == surface.step)
        .map_or(0, |i| i + 1);

    writeln!(output).map_err(io_err)?;
    writeln!(
        output,
        "== {} (step {} of {}) ==",
        step_title(surface.step),
        position,
        StepId::ALL.len()
    )
    .map_err(io_err)?;

    for error in &surface.errors {
        writeln!(output, "  ! {}", error.message).map_err(io_err)?;
    }

    for section in &surface.sections {
        writeln!(output, "-- {} --", section.title).map_err(io_err)?;
        for item in &section.items {
            writeln!(output, "  {}: {}", item.label, item.value).map_err(io_err)?;
        }
    }
    Ok(())
}

/// The choices offered for a surface, in prompt order.
fn choices(surface: &WizardSurface) -> Vec<(String, String, Action)> {
    let mut choices = Vec::new();
    if surface.navigation.previous_enabled {
        choices.push(("p".to_string(), "previous".to_string(), Action::Previous));
    }
    if surface.navigation.next_visible {
        choices.push(("n".to_string(), "next".to_string(), Action::Next));
    }
    for (index, jump) in surface.sections.iter().map(|s| &s.jump).enumerate() {
        choices.push((
            (index + 1).to_string(),
            jump.label.to_lowercase(),
            Action::Jump(jump.target),
        ));
    }
    if surface.navigation.submit_visible {
        choices.push(("s".to_string(), "submit".to_string(), Action::Submit));
    }
    choices
}

// =============================================================================
// PROMPTS
// =============================================================================

/// Prompt for every field on the surface. `None` at end of input.
fn prompt_fields<R: BufRead, W: Write>(
    surface: &WizardSurface,
    input: &mut R,
    output: &mut W,
) -> Result<Option<Submission>, WizardError> {
    let mut values = Submission::new();
    for field in &surface.fields {
        let marker = if field.required { "*" } else { "" };
        write!(output, "{}{} [{}]: ", field.label, marker, field.value).map_err(io_err)?;
        output.flush().map_err(io_err)?;

        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        let value = match line.trim() {
            "" => field.value.clone(),
            CLEAR_MARKER => String::new(),
            _ => line,
        };
        values.insert(field.name.clone(), value);
    }
    Ok(Some(values))
}

/// Prompt until a listed choice (or `q`) is entered. `None` means quit.
fn prompt_action<R: BufRead, W: Write>(
    surface: &WizardSurface,
    input: &mut R,
    output: &mut W,
) -> Result<Option<Action>, WizardError> {
    let choices = choices(surface);
    let menu: Vec<String> = choices
        .iter()
        .map(|(key, label, _)| format!("[{}] {}", key, label))
        .chain(std::iter::once("[q] quit".to_string()))
        .collect();

    loop {
        write!(output, "{}: ", menu.join("  ")).map_err(io_err)?;
        output.flush().map_err(io_err)?;

        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        let answer = line.trim().to_lowercase();
        if answer == "q" {
            return Ok(None);
        }
        if let Some((_, _, action)) = choices.iter().find(|(key, _, _)| *key == answer) {
            return Ok(Some(*action));
        }
        writeln!(output, "Unknown choice '{}'", answer).map_err(io_err)?;
    }
}

// =============================================================================
// WIZARD LOOP
// =============================================================================

/// Run the wizard for `record` until it is submitted or the user quits.
pub fn run_terminal_wizard<S, U, R, W>(
    controller: &WizardController,
    record: Record,
    store: &mut S,
    user: &U,
    input: &mut R,
    output: &mut W,
) -> Result<WizardExit, WizardError>
where
    S: RecordStore + ?Sized,
    U: ActingUser + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut state = WizardSessionState::new();
    let mut surface = controller.start(&mut state, Some(record))?;

    loop {
        render(&surface, output)?;

        let Some(values) = prompt_fields(&surface, input, output)? else {
            return Ok(WizardExit::Cancelled);
        };
        let Some(action) = prompt_action(&surface, input, output)? else {
            return Ok(WizardExit::Cancelled);
        };

        match controller.handle_navigation(&mut state, action, &values, &mut *store, user) {
            Ok(NavigationOutcome::Surface(next)) => surface = next,
            Ok(NavigationOutcome::Submitted(result)) => {
                writeln!(output).map_err(io_err)?;
                writeln!(output, "{}", result.message).map_err(io_err)?;
                writeln!(output, "{}", result.edit_link).map_err(io_err)?;
                return Ok(WizardExit::Submitted(result));
            }
            Err(e @ WizardError::InvalidAction { .. }) => {
                writeln!(output, "{}", e).map_err(io_err)?;
            }
            Err(e) => return Err(e),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
