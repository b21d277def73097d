//! The interactive menu.
//!
//! The shell reads from any [`BufRead`] and writes to any [`Write`], so the
//! whole session can be scripted in tests.

use std::io::{self, BufRead, Write};

use gradebook::{
    Gradebook, ReportError, StudentId, StudentName, ValidationError,
    domain::validate::{validate_score, validate_subject_count, validate_top_n},
};
use tracing::instrument;

use super::{output, terminal::Tone};

const MENU: &str = "\n1. Add Student\n2. Show All\n3. Modify Student\n4. Delete Student\
                    \n5. Class Average\n6. Ranking\n7. Failed Students\n8. Save Data\n9. Exit\
                    \nEnter your choice: ";

/// Why a session stopped early.
#[derive(Debug, thiserror::Error)]
pub enum Interrupt {
    /// The input stream was closed.
    #[error("end of input")]
    EndOfInput,

    /// Reading or writing the terminal failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

type Result<T> = std::result::Result<T, Interrupt>;

/// A menu choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Add,
    ShowAll,
    Modify,
    Delete,
    Average,
    Ranking,
    Failed,
    Save,
    Exit,
}

impl Choice {
    fn parse(input: &str) -> Option<Self> {
        let choice = match input.trim().parse::<u8>().ok()? {
            1 => Self::Add,
            2 => Self::ShowAll,
            3 => Self::Modify,
            4 => Self::Delete,
            5 => Self::Average,
            6 => Self::Ranking,
            7 => Self::Failed,
            8 => Self::Save,
            9 => Self::Exit,
            _ => return None,
        };
        Some(choice)
    }
}

/// An interactive session over a gradebook.
pub struct Shell<R, W> {
    gradebook: Gradebook,
    input: R,
    output: W,
    color: bool,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    /// Creates a session reading commands from `input` and writing to
    /// `output`. Colour is off until [`with_color`](Self::with_color).
    pub const fn new(gradebook: Gradebook, input: R, output: W) -> Self {
        Self {
            gradebook,
            input,
            output,
            color: false,
        }
    }

    /// Enables coloured messages.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Runs the menu until the user exits or the input ends, then saves.
    ///
    /// Returns the gradebook so callers can inspect the final state.
    #[instrument(skip(self), fields(path = %self.gradebook.path().display()))]
    pub fn run(mut self) -> anyhow::Result<Gradebook> {
        loop {
            match self.step() {
                Ok(Some(Choice::Exit)) | Err(Interrupt::EndOfInput) => break,
                Ok(_) => {}
                Err(Interrupt::Io(e)) => return Err(e.into()),
            }
        }

        tracing::debug!("Session ending, saving roster");
        if let Err(e) = self.gradebook.save() {
            self.say(&format!("Error: {e}"), Tone::Warning)?;
            return Err(e.into());
        }
        self.say("Data saved successfully!", Tone::Success)?;
        Ok(self.gradebook)
    }

    fn step(&mut self) -> Result<Option<Choice>> {
        let line = self.prompt(MENU)?;
        let Some(choice) = Choice::parse(&line) else {
            self.say("Invalid choice!", Tone::Warning)?;
            return Ok(None);
        };

        tracing::debug!(?choice, "Menu selection");
        match choice {
            Choice::Add => self.add_student()?,
            Choice::ShowAll => self.show_all()?,
            Choice::Modify => self.modify_student()?,
            Choice::Delete => self.delete_student()?,
            Choice::Average => self.class_average()?,
            Choice::Ranking => self.ranking()?,
            Choice::Failed => self.failed_students()?,
            Choice::Save => self.save()?,
            Choice::Exit => {}
        }
        Ok(Some(choice))
    }

    fn add_student(&mut self) -> Result<()> {
        let name: StudentName = self.prompt_valid("Enter student name: ", StudentName::new)?;

        let id = loop {
            let id: StudentId = self.prompt_valid("Enter student ID: ", |s| s.trim().parse())?;
            if self.gradebook.store().contains(&id) {
                self.say("ID already exists! Please enter a unique ID.", Tone::Warning)?;
            } else {
                break id;
            }
        };

        let subjects = self.prompt_valid("Number of subjects: ", validate_subject_count)?;
        let scores = self.prompt_scores(subjects)?;

        match self.gradebook.add(name, id, scores) {
            Ok(_) => self.say("Student added successfully!", Tone::Success),
            Err(e) => self.say(&format!("Error: {e}"), Tone::Warning),
        }
    }

    fn show_all(&mut self) -> Result<()> {
        let rows = self.gradebook.report().listing();
        if rows.is_empty() {
            return self.say("No student data!", Tone::Warning);
        }
        output::write_details(&mut self.output, &rows)?;
        Ok(())
    }

    fn modify_student(&mut self) -> Result<()> {
        let id = self.prompt_existing("Enter student ID to modify: ")?;
        let Some((id, record)) = id.and_then(|id| {
            let record = self.gradebook.store().get(&id)?.clone();
            Some((id, record))
        }) else {
            return self.say("Student not found!", Tone::Warning);
        };
        let current = record.scores();

        self.say(&format!("Current scores for {}:", record.name()), Tone::Info)?;
        for (i, score) in current.iter().enumerate() {
            writeln!(self.output, "Subject {}: {score}", i + 1)?;
        }

        writeln!(self.output, "Enter new scores:")?;
        let scores = self.prompt_scores(current.len())?;

        match self.gradebook.modify(&id, scores) {
            Ok(_) => self.say("Scores updated successfully!", Tone::Success),
            Err(e) => self.say(&format!("Error: {e}"), Tone::Warning),
        }
    }

    fn delete_student(&mut self) -> Result<()> {
        if self.gradebook.store().is_empty() {
            return self.say("No students to delete!", Tone::Warning);
        }

        let deleted = self
            .prompt_existing("Enter student ID to delete: ")?
            .is_some_and(|id| self.gradebook.delete(&id));

        if deleted {
            self.say("Student deleted successfully!", Tone::Success)
        } else {
            self.say("Student not found!", Tone::Warning)
        }
    }

    fn class_average(&mut self) -> Result<()> {
        let average = self.gradebook.report().class_average();
        match average {
            Ok(average) => {
                writeln!(self.output, "Class average: {average}")?;
                Ok(())
            }
            Err(ReportError::EmptyStore) => self.say("No student data!", Tone::Warning),
        }
    }

    fn ranking(&mut self) -> Result<()> {
        let top_n = self.prompt_valid(
            "Enter number of top students to show (0 for all): ",
            validate_top_n,
        )?;

        if self.gradebook.store().is_empty() {
            return self.say("No student data!", Tone::Warning);
        }
        let report = self.gradebook.report();
        let rows = report.rows(report.ranking(top_n));
        output::write_ranking(&mut self.output, &rows)?;
        Ok(())
    }

    fn failed_students(&mut self) -> Result<()> {
        if self.gradebook.store().is_empty() {
            return self.say("No student data!", Tone::Warning);
        }

        let report = self.gradebook.report();
        let rows = report.rows(report.failed_students());
        if rows.is_empty() {
            return self.say("No failed students!", Tone::Success);
        }
        output::write_details(&mut self.output, &rows)?;
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        match self.gradebook.save() {
            Ok(()) => self.say("Data saved successfully!", Tone::Success),
            Err(e) => {
                tracing::warn!("Save failed: {e}");
                self.say(&format!("Error: {e}"), Tone::Warning)
            }
        }
    }

    /// Prompts for an id and returns it only if a student has it.
    fn prompt_existing(&mut self, message: &str) -> Result<Option<StudentId>> {
        let line = self.prompt(message)?;
        Ok(line
            .trim()
            .parse::<StudentId>()
            .ok()
            .filter(|id| self.gradebook.store().contains(id)))
    }

    fn prompt_scores(&mut self, subjects: usize) -> Result<Vec<f64>> {
        (1..=subjects)
            .map(|subject| {
                self.prompt_valid(
                    &format!("Score for subject {subject} (0-100): "),
                    validate_score,
                )
            })
            .collect()
    }

    /// Prompts until `validate` accepts the input.
    fn prompt_valid<T, F>(&mut self, message: &str, validate: F) -> Result<T>
    where
        F: Fn(&str) -> std::result::Result<T, ValidationError>,
    {
        loop {
            let line = self.prompt(message)?;
            match validate(&line) {
                Ok(value) => return Ok(value),
                Err(e) => self.say(&format!("Invalid input! {e}"), Tone::Warning)?,
            }
        }
    }

    /// Writes `message` and reads one line, without its line terminator.
    fn prompt(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{message}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(Interrupt::EndOfInput);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(line)
    }

    fn say(&mut self, message: &str, tone: Tone) -> Result<()> {
        writeln!(self.output, "{}", tone.paint(message, self.color))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Cursor, path::Path};

    use gradebook::Config;

    use super::*;

    fn gradebook(dir: &Path) -> Gradebook {
        let mut config = Config::default();
        config.set_data_file(dir.join("grades.dat"));
        Gradebook::open(&config).unwrap()
    }

    fn session(dir: &Path, input: &str) -> (Gradebook, String) {
        let mut output = Vec::new();
        let gradebook = Shell::new(gradebook(dir), Cursor::new(input.to_string()), &mut output)
            .run()
            .unwrap();
        (gradebook, String::from_utf8(output).unwrap())
    }

    fn ids(gradebook: &Gradebook) -> Vec<String> {
        gradebook
            .store()
            .all()
            .iter()
            .map(|r| r.id().to_string())
            .collect()
    }

    #[test]
    fn menu_choices() {
        assert_eq!(Choice::parse(" 1 "), Some(Choice::Add));
        assert_eq!(Choice::parse("9"), Some(Choice::Exit));
        assert_eq!(Choice::parse("0"), None);
        assert_eq!(Choice::parse("10"), None);
        assert_eq!(Choice::parse("add"), None);
    }

    #[test]
    fn add_report_and_exit() {
        let tmp = tempfile::tempdir().unwrap();
        let input = "1\nAlice\nS1\n2\n90\n55\n\
                     1\nBob\nS2\n2\n70\n80\n\
                     5\n6\n1\n7\n9\n";

        let (gradebook, out) = session(tmp.path(), input);

        assert_eq!(ids(&gradebook), ["S1", "S2"]);
        assert!(out.contains("Class average: 147.5"));
        assert!(out.contains("Ranking List:\n1. Bob (Total: 150)\n\n1. Add Student"));
        assert!(out.contains("\nName: Alice\nID: S1\nTotal: 145\n"));
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("grades.dat")).unwrap(),
            "Alice,S1,90,55\nBob,S2,70,80\n"
        );
    }

    #[test]
    fn invalid_input_is_reprompted() {
        let tmp = tempfile::tempdir().unwrap();
        let input = "x\n1\n  \nAlice\nS 1\nS1\nmany\n1\nabc\n101\n-1\n75\n9\n";

        let (gradebook, out) = session(tmp.path(), input);

        assert!(out.contains("Invalid choice!"));
        assert!(out.contains("Invalid input! student name cannot be empty"));
        assert!(out.contains("Invalid input! student ID 'S 1' cannot contain whitespace or commas"));
        assert!(out.contains("Invalid input! 'many' is not a valid number of subjects"));
        assert_eq!(out.matches("Score for subject 1 (0-100): ").count(), 4);
        assert_eq!(gradebook.store().all()[0].scores(), &[75.0]);
    }

    #[test]
    fn duplicate_ids_are_reprompted() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("grades.dat"), "Alice,S1,90\n").unwrap();
        let input = "1\nImpostor\nS1\nS2\n0\n9\n";

        let (gradebook, out) = session(tmp.path(), input);

        assert!(out.contains("ID already exists! Please enter a unique ID."));
        assert_eq!(ids(&gradebook), ["S1", "S2"]);
        assert_eq!(gradebook.store().all()[0].name().as_str(), "Alice");
    }

    #[test]
    fn modify_shows_current_scores() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("grades.dat"), "Alice,S1,90,55\n").unwrap();
        let input = "3\nS1\n91\n65\n3\nS9\n9\n";

        let (gradebook, out) = session(tmp.path(), input);

        assert!(out.contains("Current scores for Alice:\nSubject 1: 90\nSubject 2: 55\n"));
        assert!(out.contains("Scores updated successfully!"));
        assert!(out.contains("Student not found!"));
        assert_eq!(gradebook.store().all()[0].scores(), &[91.0, 65.0]);
    }

    #[test]
    fn delete_flow() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("grades.dat"), "Alice,S1,90\nBob,S2,70\n").unwrap();
        let input = "4\nS1\n4\nS1\n4\nS2\n4\n9\n";

        let (gradebook, out) = session(tmp.path(), input);

        assert_eq!(out.matches("Student deleted successfully!").count(), 2);
        assert_eq!(out.matches("Student not found!").count(), 1);
        assert!(out.contains("No students to delete!"));
        assert!(gradebook.store().is_empty());
    }

    #[test]
    fn empty_roster_reports() {
        let tmp = tempfile::tempdir().unwrap();
        let input = "2\n5\n6\n0\n7\n9\n";

        let (_, out) = session(tmp.path(), input);

        assert_eq!(out.matches("No student data!").count(), 4);
    }

    #[test]
    fn no_failed_students() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("grades.dat"), "Bob,S2,70,80\n").unwrap();

        let (_, out) = session(tmp.path(), "7\n9\n");

        assert!(out.contains("No failed students!"));
    }

    #[test]
    fn end_of_input_saves() {
        let tmp = tempfile::tempdir().unwrap();
        // Input ends in the middle of adding a second student.
        let input = "1\nAlice\nS1\n1\n90\n1\nBob\n";

        let (gradebook, _) = session(tmp.path(), input);

        assert_eq!(ids(&gradebook), ["S1"]);
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("grades.dat")).unwrap(),
            "Alice,S1,90\n"
        );
    }

    #[test]
    fn explicit_save() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("grades.dat");
        let mut output = Vec::new();
        let input = Cursor::new("1\nAlice\nS1\n0\n8\n".to_string());

        // The session is cut short before exit, but option 8 already saved.
        let shell = Shell::new(gradebook(tmp.path()), input, &mut output);
        shell.run().unwrap();

        let out = String::from_utf8(output).unwrap();
        assert_eq!(out.matches("Data saved successfully!").count(), 2);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "Alice,S1\n");
    }

    #[test]
    fn failed_exit_save_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        // The data file's parent is a regular file, so saving must fail.
        std::fs::write(tmp.path().join("blocker"), "").unwrap();
        config.set_data_file(tmp.path().join("blocker").join("grades.dat"));
        let mut output = Vec::new();

        let result = Shell::new(Gradebook::empty(&config), Cursor::new("9\n"), &mut output).run();

        assert!(result.is_err());
        assert!(String::from_utf8(output).unwrap().contains("Error: failed to write data file"));
    }
}
