// 🖥️ Console Menu - numbered text interface over the registry
//
// Each prompt re-asks until the input parses. EOF on input ends the session
// without the exit-save.

use crate::config::Settings;
use crate::entities::{
    KindTag, Member, MemberKind, MemberRegistry, MembershipStatus, PerformanceRecord,
};
use crate::entities::member::{MAX_YEAR, MIN_YEAR};
use crate::storage;
use chrono::{Local, NaiveDate};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// "Exit and save" chosen
    Exit,
    /// Input closed
    Eof,
}

/// Bail out of a handler when the input stream closes mid-prompt
macro_rules! or_eof {
    ($prompt:expr) => {
        match $prompt? {
            Some(value) => value,
            None => return Ok(Flow::Eof),
        }
    };
}

pub struct Console<R, W> {
    input: R,
    out: W,
    registry: MemberRegistry,
    settings: Settings,
    today: NaiveDate,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, out: W, registry: MemberRegistry, settings: Settings) -> Self {
        Self {
            input,
            out,
            registry,
            settings,
            today: Local::now().date_naive(),
        }
    }

    pub fn registry(&self) -> &MemberRegistry {
        &self.registry
    }

    pub fn into_parts(self) -> (MemberRegistry, W) {
        (self.registry, self.out)
    }

    /// Load the default file, then serve the menu until exit or EOF
    pub fn run(&mut self) -> io::Result<()> {
        let default_file = self.settings.data_file.clone();
        self.load_from(&default_file)?;
        writeln!(self.out, "Welcome to the Member Management System (Text Mode).")?;

        loop {
            self.display_main_menu()?;
            let Some(line) = self.read_line("Please choose an option: ")? else {
                writeln!(self.out, "\nInput closed. Exiting without saving.")?;
                return Ok(());
            };

            let choice = match line.trim().parse::<u32>() {
                Ok(choice) => choice,
                Err(_) => {
                    writeln!(self.out, "❌ Invalid input. Please enter a number.")?;
                    continue;
                }
            };

            match self.dispatch(choice)? {
                Flow::Continue => {}
                Flow::Exit => {
                    writeln!(self.out, "Exiting Text Mode...")?;
                    return Ok(());
                }
                Flow::Eof => {
                    writeln!(self.out, "\nInput closed. Exiting without saving.")?;
                    return Ok(());
                }
            }
        }
    }

    fn display_main_menu(&mut self) -> io::Result<()> {
        let file = self.settings.data_file.display().to_string();
        writeln!(self.out, "\n===== Member Management System (Text Mode) =====")?;
        writeln!(self.out, "1. Load records from a file")?;
        writeln!(self.out, "2. View all members")?;
        writeln!(self.out, "3. Add a new member")?;
        writeln!(self.out, "4. Update a member's status (Freeze/Activate)")?;
        writeln!(self.out, "5. Add a performance record")?;
        writeln!(self.out, "6. Edit member name / trainer fee")?;
        writeln!(self.out, "7. Delete a member")?;
        writeln!(self.out, "8. Search / Filter members...")?;
        writeln!(self.out, "9. Sort members...")?;
        writeln!(self.out, "10. Save records to a new file")?;
        writeln!(self.out, "11. Exit and save to {}", file)?;
        writeln!(self.out, "================================================")
    }

    fn dispatch(&mut self, choice: u32) -> io::Result<Flow> {
        match choice {
            1 => self.handle_load_file(),
            2 => {
                self.handle_view_all()?;
                Ok(Flow::Continue)
            }
            3 => self.handle_add_member(),
            4 => self.handle_update_status(),
            5 => self.handle_add_performance(),
            6 => self.handle_edit_member(),
            7 => self.handle_delete_member(),
            8 => self.handle_search_menu(),
            9 => self.handle_sort_menu(),
            10 => self.handle_save_to_file(),
            11 => {
                let path = self.settings.data_file.clone();
                if self.save_to(&path)? {
                    Ok(Flow::Exit)
                } else {
                    writeln!(self.out, "Changes kept in memory. Choose 10 to save elsewhere.")?;
                    Ok(Flow::Continue)
                }
            }
            _ => {
                writeln!(self.out, "Invalid option. Please enter a number between 1 and 11.")?;
                Ok(Flow::Continue)
            }
        }
    }

    // ========================================================================
    // HANDLERS
    // ========================================================================

    fn handle_load_file(&mut self) -> io::Result<Flow> {
        let filename = or_eof!(self.prompt_required("Enter filename to load (e.g., gym_records.csv): "));
        self.load_from(Path::new(&filename))?;
        Ok(Flow::Continue)
    }

    fn handle_view_all(&mut self) -> io::Result<()> {
        if self.registry.is_empty() {
            return writeln!(self.out, "There are no members in the system.");
        }

        let members = self.registry.list().to_vec();
        self.print_members(&format!("All Members ({})", members.len()), &members)
    }

    fn handle_add_member(&mut self) -> io::Result<Flow> {
        let kind = or_eof!(self.prompt_parsed("Enter Member Type (Regular/Premium): ", |s| {
            s.parse::<KindTag>().map_err(|e| e.to_string())
        }));

        let id = or_eof!(self.prompt_required("Enter Member ID (e.g., M011): "));
        if self.registry.contains(&id) {
            writeln!(self.out, "❌ Error: A member with this ID already exists.")?;
            return Ok(Flow::Continue);
        }

        let name = or_eof!(self.prompt_required("Enter Full Name: "));

        let member_kind = match kind {
            KindTag::Regular => MemberKind::Regular,
            KindTag::Premium => {
                let fee = or_eof!(self.prompt_parsed("Enter Personal Trainer Fee: ", parse_fee));
                MemberKind::Premium { trainer_fee: fee }
            }
        };

        let result = Member::new(&id, &name, self.today, member_kind)
            .and_then(|member| self.registry.add(member));

        match result {
            Ok(()) => writeln!(self.out, "✓ {} member added successfully!", kind)?,
            Err(e) => writeln!(self.out, "❌ Error: {}", e)?,
        }
        Ok(Flow::Continue)
    }

    fn handle_update_status(&mut self) -> io::Result<Flow> {
        let id = or_eof!(self.prompt_required("Enter the Member ID to update status: "));
        let Some(member) = self.registry.find_by_id(&id) else {
            writeln!(self.out, "❌ Member not found.")?;
            return Ok(Flow::Continue);
        };

        let (name, current) = (member.name().to_string(), member.status());
        writeln!(self.out, "Current status for {} is: {}", name, current)?;

        let status = or_eof!(self.prompt_parsed("Enter new status (ACTIVE/FROZEN): ", |s| {
            s.parse::<MembershipStatus>().map_err(|e| e.to_string())
        }));

        match self.registry.set_status(&id, status) {
            Ok(()) => writeln!(self.out, "✓ Status updated successfully!")?,
            Err(e) => writeln!(self.out, "❌ Error: {}", e)?,
        }
        Ok(Flow::Continue)
    }

    fn handle_add_performance(&mut self) -> io::Result<Flow> {
        let id = or_eof!(self.prompt_required("Enter Member ID for performance record: "));
        let Some(name) = self.registry.find_by_id(&id).map(|m| m.name().to_string()) else {
            writeln!(self.out, "❌ Member not found.")?;
            return Ok(Flow::Continue);
        };

        let month = or_eof!(self.prompt_parsed("Enter performance month (1-12): ", parse_month));
        let year = or_eof!(self.prompt_parsed("Enter performance year: ", parse_year));
        let achieved = or_eof!(self.prompt_parsed(
            "Was the monthly goal achieved? (true/false): ",
            parse_bool
        ));

        let result = PerformanceRecord::new(month, year, achieved)
            .and_then(|record| self.registry.add_performance(&id, record));

        match result {
            Ok(()) => writeln!(self.out, "✓ Performance record added for {}", name)?,
            Err(e) => writeln!(self.out, "❌ Error: {}", e)?,
        }
        Ok(Flow::Continue)
    }

    fn handle_edit_member(&mut self) -> io::Result<Flow> {
        let id = or_eof!(self.prompt_required("Enter the ID of the member to update: "));
        let Some(member) = self.registry.find_by_id(&id) else {
            writeln!(self.out, "❌ Member with ID {} not found.", id)?;
            return Ok(Flow::Continue);
        };
        let current_name = member.name().to_string();
        let current_fee = member.kind().trainer_fee();

        let prompt = format!("Enter new Full Name (or press Enter to keep '{}'): ", current_name);
        let new_name = or_eof!(self.read_line(&prompt));
        if !new_name.trim().is_empty() {
            match self.registry.rename(&id, &new_name) {
                Ok(()) => writeln!(self.out, "Name updated.")?,
                Err(e) => writeln!(self.out, "❌ Error: {}", e)?,
            }
        }

        if let Some(fee) = current_fee {
            let prompt = format!(
                "Enter new Personal Trainer Fee (or press Enter to keep '{:.2}'): ",
                fee
            );
            let new_fee = or_eof!(self.prompt_parsed(&prompt, |s| {
                if s.is_empty() {
                    Ok(None)
                } else {
                    parse_fee(s).map(Some)
                }
            }));

            if let Some(new_fee) = new_fee {
                match self.registry.set_trainer_fee(&id, new_fee) {
                    Ok(()) => writeln!(self.out, "Fee updated.")?,
                    Err(e) => writeln!(self.out, "❌ Error: {}", e)?,
                }
            }
        }

        writeln!(self.out, "Update complete for member {}.", id.trim())?;
        Ok(Flow::Continue)
    }

    fn handle_delete_member(&mut self) -> io::Result<Flow> {
        let id = or_eof!(self.prompt_required("Enter Member ID to delete: "));
        if self.registry.delete(&id) {
            writeln!(self.out, "✓ Member {} was successfully deleted.", id.trim())?;
        } else {
            writeln!(self.out, "❌ Member with ID {} not found.", id.trim())?;
        }
        Ok(Flow::Continue)
    }

    fn handle_search_menu(&mut self) -> io::Result<Flow> {
        loop {
            writeln!(self.out, "\n--- Search & Filter Menu ---")?;
            writeln!(self.out, "1. Search by Name")?;
            writeln!(self.out, "2. Filter by Member Type")?;
            writeln!(self.out, "3. Filter by Performance")?;
            writeln!(self.out, "4. Return to Main Menu")?;

            let choice = or_eof!(self.prompt_parsed("Choose an option: ", parse_number));
            match choice {
                1 => {
                    let name = or_eof!(self.read_line("Enter name to search for: "));
                    let results = self.registry.find_by_name(&name);
                    self.print_results(&format!("Search Results for '{}'", name.trim()), &results)?;
                }
                2 => {
                    let kind = or_eof!(self.prompt_parsed("Enter type to filter (Regular/Premium): ", |s| {
                        s.parse::<KindTag>().map_err(|e| e.to_string())
                    }));
                    let results = self.registry.filter_by_kind(kind);
                    self.print_results(&format!("Filter Results for Type: {}", kind), &results)?;
                }
                3 => {
                    let month = or_eof!(self.prompt_parsed("Enter month (1-12): ", parse_month));
                    let year = or_eof!(self.prompt_parsed("Enter year: ", parse_year));
                    let achieved = or_eof!(self.prompt_parsed(
                        "Filter by goal achieved? (true/false): ",
                        parse_bool
                    ));

                    let results = self.registry.filter_by_performance(month, year, achieved);
                    let outcome = if achieved { "Achieved Goal" } else { "Did Not Achieve Goal" };
                    self.print_results(
                        &format!("Filter Results for Performance: {} in {}/{}", outcome, month, year),
                        &results,
                    )?;
                }
                4 => return Ok(Flow::Continue),
                _ => writeln!(self.out, "Invalid option.")?,
            }
        }
    }

    fn handle_sort_menu(&mut self) -> io::Result<Flow> {
        writeln!(self.out, "\n--- Sort Members Menu ---")?;
        writeln!(self.out, "1. Sort by Member ID (Default)")?;
        writeln!(self.out, "2. Sort by Name")?;
        writeln!(self.out, "3. Sort by Join Date")?;
        writeln!(self.out, "4. Back to Main Menu")?;

        let choice = or_eof!(self.prompt_parsed("Choose an option: ", parse_number));
        let label = match choice {
            1 => {
                self.registry.sort_by_id();
                "ID"
            }
            2 => {
                self.registry.sort_by_name();
                "Name"
            }
            3 => {
                self.registry.sort_by_join_date();
                "Join Date"
            }
            4 => {
                writeln!(self.out, "Returning to main menu...")?;
                return Ok(Flow::Continue);
            }
            _ => {
                writeln!(self.out, "Invalid option.")?;
                return Ok(Flow::Continue);
            }
        };

        writeln!(self.out, "Members sorted by {}.", label)?;
        self.handle_view_all()?;
        Ok(Flow::Continue)
    }

    fn handle_save_to_file(&mut self) -> io::Result<Flow> {
        let filename =
            or_eof!(self.prompt_required("Enter filename to save to (e.g., members_backup.csv): "));
        self.save_to(Path::new(&filename))?;
        Ok(Flow::Continue)
    }

    // ========================================================================
    // FILE HELPERS
    // ========================================================================

    /// Replace the registry with the file's contents. On failure the
    /// registry is left empty.
    fn load_from(&mut self, path: &Path) -> io::Result<()> {
        match storage::load_file(path) {
            Ok(report) => {
                for issue in &report.issues {
                    writeln!(self.out, "⚠️  Skipped row. {}", issue)?;
                }
                writeln!(
                    self.out,
                    "✓ Successfully loaded {} members from {}",
                    report.loaded(),
                    path.display()
                )?;
                if report.skipped() > 0 {
                    writeln!(self.out, "  ({} malformed rows skipped)", report.skipped())?;
                }
                self.registry = report.registry;
            }
            Err(e) => {
                self.registry.clear();
                writeln!(self.out, "❌ Error: {}", e)?;
            }
        }
        Ok(())
    }

    /// Returns false when the write failed (the error is already reported)
    fn save_to(&mut self, path: &Path) -> io::Result<bool> {
        match storage::save_file(path, &self.registry) {
            Ok(count) => {
                info!(path = %path.display(), count, "console save");
                writeln!(self.out, "✓ Successfully saved {} members to {}", count, path.display())?;
                Ok(true)
            }
            Err(e) => {
                writeln!(self.out, "❌ Error: {}", e)?;
                Ok(false)
            }
        }
    }

    // ========================================================================
    // OUTPUT
    // ========================================================================

    fn print_members(&mut self, header: &str, members: &[Member]) -> io::Result<()> {
        writeln!(self.out, "\n--- {} ---", header)?;
        for member in members {
            writeln!(self.out, "{}", member.describe(&self.settings.fees))?;
            writeln!(self.out, "-------------------")?;
        }
        Ok(())
    }

    fn print_results(&mut self, header: &str, results: &[Member]) -> io::Result<()> {
        if results.is_empty() {
            writeln!(self.out, "\n--- {} ---", header)?;
            return writeln!(self.out, "No members found matching your criteria.");
        }
        self.print_members(header, results)
    }

    // ========================================================================
    // PROMPTS
    // ========================================================================

    /// Print a prompt and read one line. `None` means the input closed.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Re-prompt until `parse` accepts the trimmed line
    fn prompt_parsed<T, F>(&mut self, prompt: &str, parse: F) -> io::Result<Option<T>>
    where
        F: Fn(&str) -> Result<T, String>,
    {
        loop {
            let Some(line) = self.read_line(prompt)? else {
                return Ok(None);
            };
            match parse(line.trim()) {
                Ok(value) => return Ok(Some(value)),
                Err(msg) => writeln!(self.out, "❌ {}", msg)?,
            }
        }
    }

    fn prompt_required(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompt_parsed(prompt, |s| {
            if s.is_empty() {
                Err("This field cannot be empty.".to_string())
            } else {
                Ok(s.to_string())
            }
        })
    }
}

// ============================================================================
// INPUT PARSERS
// ============================================================================

fn parse_number(s: &str) -> Result<u32, String> {
    s.parse()
        .map_err(|_| "Invalid input. Please enter a number.".to_string())
}

fn parse_month(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(month) if (1..=12).contains(&month) => Ok(month),
        _ => Err("Month must be a number between 1 and 12.".to_string()),
    }
}

fn parse_year(s: &str) -> Result<i32, String> {
    match s.parse::<i32>() {
        Ok(year) if (MIN_YEAR..=MAX_YEAR).contains(&year) => Ok(year),
        _ => Err(format!("Year must be a number between {} and {}.", MIN_YEAR, MAX_YEAR)),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" => Ok(true),
        "false" | "f" | "no" | "n" => Ok(false),
        _ => Err("Please enter true or false.".to_string()),
    }
}

fn parse_fee(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(fee) if fee.is_finite() && fee >= 0.0 => Ok(fee),
        _ => Err("Invalid fee. Please enter a non-negative number.".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn settings_in(dir: &Path) -> Settings {
        Settings {
            data_file: dir.join("gym_records.csv"),
            ..Settings::default()
        }
    }

    fn run_script(settings: Settings, script: &str) -> (MemberRegistry, String) {
        let mut console = Console::new(script.as_bytes(), Vec::new(), MemberRegistry::new(), settings);
        console.run().unwrap();
        let (registry, out) = console.into_parts();
        (registry, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_add_view_delete_and_exit_saves() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let data_file: PathBuf = settings.data_file.clone();

        let script = "\
3\nRegular\nM001\nAna Lopez\n\
3\nPremium\nP001\nBen Ito\nabc\n20\n\
2\n\
7\nM001\n\
11\n";
        let (registry, out) = run_script(settings, script);

        assert!(out.contains("Regular member added successfully!"));
        assert!(out.contains("Premium member added successfully!"));
        assert!(out.contains("Invalid fee"));
        assert!(out.contains("All Members (2)"));
        assert!(out.contains("Member M001 was successfully deleted."));

        assert_eq!(registry.len(), 1);
        let saved = fs::read_to_string(&data_file).unwrap();
        assert!(saved.starts_with("P001,Ben Ito,Premium,"));
        assert_eq!(saved.lines().count(), 1);
    }

    #[test]
    fn test_duplicate_and_missing_ids_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let script = "\
3\nRegular\nM001\nAna\n\
3\nRegular\nm001\n\
7\nM999\n\
4\nM999\n";
        let (registry, out) = run_script(settings_in(dir.path()), script);

        assert!(out.contains("A member with this ID already exists."));
        assert!(out.contains("Member with ID M999 not found."));
        assert!(out.contains("Member not found."));
        assert!(out.contains("Input closed. Exiting without saving."));
        assert_eq!(registry.len(), 1);
        assert!(!dir.path().join("gym_records.csv").exists());
    }

    #[test]
    fn test_status_and_performance_reprompt_on_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let script = "\
x\n\
3\nPremium\nP001\nBen\n20\n\
4\nP001\npaused\nfrozen\n\
4\nP001\nACTIVE\n\
5\nP001\n13\n5\n1800\n2024\nmaybe\ntrue\n";
        let (registry, out) = run_script(settings_in(dir.path()), script);

        assert!(out.contains("Invalid input. Please enter a number."));
        assert!(out.contains("expected ACTIVE or FROZEN"));
        assert!(out.contains("Month must be a number between 1 and 12."));
        assert!(out.contains("Year must be a number between"));
        assert!(out.contains("Please enter true or false."));

        let ben = registry.find_by_id("P001").unwrap();
        assert_eq!(ben.status(), MembershipStatus::Active);
        assert_eq!(ben.history().len(), 1);
        assert!(ben.achieved_last_goal());
    }

    #[test]
    fn test_search_sort_and_edit() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        fs::write(
            &settings.data_file,
            "M002,zed Stone,Regular,2023-07-04,ACTIVE\nP001,Ben Ito,Premium,2024-01-10,ACTIVE,20\n",
        )
        .unwrap();

        let script = "\
8\n1\nstone\n2\npremium\n3\n5\n2024\ntrue\n4\n\
9\n2\n\
6\nP001\nBenjamin Ito\n35.5\n\
6\nM002\n\n";
        let (registry, out) = run_script(settings, script);

        assert!(out.contains("Successfully loaded 2 members"));
        assert!(out.contains("Search Results for 'stone'"));
        assert!(out.contains("Filter Results for Type: Premium"));
        assert!(out.contains("No members found matching your criteria."));
        assert!(out.contains("Members sorted by Name."));
        assert!(out.contains("Update complete for member P001."));

        let ids: Vec<&str> = registry.list().iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["P001", "M002"]);
        let ben = registry.find_by_id("P001").unwrap();
        assert_eq!(ben.name(), "Benjamin Ito");
        assert_eq!(ben.kind().trainer_fee(), Some(35.5));
        assert_eq!(registry.find_by_id("M002").unwrap().name(), "zed Stone");
    }

    #[test]
    fn test_load_failure_leaves_registry_empty() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        fs::write(&settings.data_file, "M001,Ana,Regular,2024-01-15\n").unwrap();

        let missing = dir.path().join("missing.csv");
        let script = format!("1\n{}\n", missing.display());
        let (registry, out) = run_script(settings, &script);

        assert!(out.contains("Successfully loaded 1 members"));
        assert!(out.contains("Could not read"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_failed_exit_save_keeps_session_open() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            data_file: dir.path().join("no_such_dir").join("gym_records.csv"),
            ..Settings::default()
        };

        let script = "3\nRegular\nM001\nAna Lopez\n11\n2\n";
        let (registry, out) = run_script(settings, script);

        assert!(out.contains("Could not write"));
        assert!(!out.contains("Exiting Text Mode..."));
        assert!(out.contains("All Members (1)"));
        assert!(out.contains("Input closed. Exiting without saving."));
        assert_eq!(registry.len(), 1);
    }
}
