//! Parsing for `simctl listapps` output, which is an old-style property
//! list rather than JSON.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct App {
    pub bundle_id: String,
    pub display_name: String,
    pub bundle_name: Option<String>,
    pub app_type: Option<String>,
}

impl App {
    /// Best available human-readable name.
    pub fn name(&self) -> &str {
        if !self.display_name.is_empty() {
            &self.display_name
        } else if let Some(bundle_name) = self.bundle_name.as_deref() {
            bundle_name
        } else {
            &self.bundle_id
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppList {
    pub apps: Vec<App>,
}

impl AppList {
    pub fn find_by_bundle_id(&self, bundle_id: &str) -> Option<&App> {
        self.apps.iter().find(|a| a.bundle_id == bundle_id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&App> {
        self.apps
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

/// Pulls the value out of a plist line, quoted or bare.
fn plist_value(line: &str) -> Option<String> {
    if line.contains('"') {
        line.split('"').nth(1).map(str::to_string)
    } else {
        line.split_once("= ")
            .map(|(_, v)| v.trim_end_matches([' ', ';']).to_string())
    }
}

/// Parses one app block starting at `start`, returning the app and the
/// index just past its closing brace.
fn parse_app_block(lines: &[String], start: usize) -> Option<(App, usize)> {
    let line = lines.get(start)?.trim();

    // An app block opens with `"bundle.id" = {`
    if !line.contains('"') || !line.contains('=') || !line.contains('{') {
        return None;
    }
    let bundle_id = line.split('"').nth(1)?.to_string();
    let after = line.rsplit('"').next()?;
    if !after.contains('=') || !after.contains('{') {
        return None;
    }

    let mut display_name = None;
    let mut bundle_name = None;
    let mut app_type = None;

    let mut idx = start + 1;
    let mut depth: i32 = 1;
    while idx < lines.len() && depth > 0 {
        let line = lines[idx].trim();
        depth += line.matches('{').count() as i32;
        depth -= line.matches('}').count() as i32;

        if line.contains("CFBundleDisplayName = ") {
            display_name = plist_value(line);
        } else if line.contains("CFBundleName = ") {
            bundle_name = plist_value(line);
        } else if line.contains("ApplicationType = ") {
            app_type = line
                .split_once("= ")
                .map(|(_, v)| v.trim_end_matches([' ', '"', ';']).trim_start_matches('"').to_string());
        }
        idx += 1;
    }

    if display_name.is_none() && bundle_name.is_none() {
        return None;
    }
    let display_name = display_name
        .or_else(|| bundle_name.clone())
        .unwrap_or_else(|| bundle_id.clone());
    Some((
        App {
            bundle_id,
            display_name,
            bundle_name,
            app_type,
        },
        idx,
    ))
}

pub fn parse_app_list(output: &str) -> AppList {
    if output.trim().is_empty() {
        return AppList::default();
    }

    let lines: Vec<String> = output.lines().map(str::to_string).collect();
    let mut apps = Vec::new();
    let mut idx = 0;
    while idx < lines.len() {
        if let Some((app, next)) = parse_app_block(&lines, idx) {
            apps.push(app);
            idx = next;
        } else {
            idx += 1;
        }
    }

    apps.sort_by(|a, b| a.bundle_id.cmp(&b.bundle_id));
    AppList { apps }
}

pub fn format_app_list(list: &AppList) -> String {
    if list.is_empty() {
        return "No apps found on the simulator".to_string();
    }
    let mut lines = vec![format!("Installed apps ({}):", list.len())];
    for app in &list.apps {
        lines.push(format!("• {} ({})", app.name(), app.bundle_id));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
    "com.apple.Preferences" =     {
        ApplicationType = System;
        Bundle = "file:///Applications/Preferences.app/";
        CFBundleDisplayName = Settings;
        CFBundleExecutable = Preferences;
        CFBundleIdentifier = "com.apple.Preferences";
        CFBundleName = Preferences;
        CFBundleVersion = 1;
    };
    "com.example.MyApp" =     {
        ApplicationType = User;
        CFBundleDisplayName = "My App";
        CFBundleIdentifier = "com.example.MyApp";
        CFBundleName = MyApp;
        GroupContainers =         {
        };
        CFBundleVersion = 7;
    };
}"#;

    #[test]
    fn parses_apps_from_plist_output() {
        let list = parse_app_list(SAMPLE);
        assert_eq!(list.len(), 2);

        let settings = list.find_by_bundle_id("com.apple.Preferences").unwrap();
        assert_eq!(settings.display_name, "Settings");
        assert_eq!(settings.bundle_name.as_deref(), Some("Preferences"));
        assert_eq!(settings.app_type.as_deref(), Some("System"));

        let my_app = list.find_by_bundle_id("com.example.MyApp").unwrap();
        assert_eq!(my_app.display_name, "My App");
        assert_eq!(my_app.app_type.as_deref(), Some("User"));
    }

    #[test]
    fn apps_come_back_sorted_by_bundle_id() {
        let list = parse_app_list(SAMPLE);
        let ids: Vec<&str> = list.apps.iter().map(|a| a.bundle_id.as_str()).collect();
        assert_eq!(ids, vec!["com.apple.Preferences", "com.example.MyApp"]);
    }

    #[test]
    fn name_lookup_is_case_insensitive_on_display_name() {
        let list = parse_app_list(SAMPLE);
        assert!(list.find_by_name("settings").is_some());
        assert!(list.find_by_name("my app").is_some());
        assert!(list.find_by_name("missing").is_none());
    }

    #[test]
    fn empty_output_is_an_empty_list() {
        assert!(parse_app_list("").is_empty());
        assert!(parse_app_list("   \n  ").is_empty());
    }

    #[test]
    fn nested_blocks_do_not_leak_into_the_next_app() {
        // GroupContainers nests a brace inside com.example.MyApp; the
        // parser must still see both apps.
        let list = parse_app_list(SAMPLE);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn formatting_lists_names_and_bundle_ids() {
        let list = parse_app_list(SAMPLE);
        let text = format_app_list(&list);
        assert!(text.starts_with("Installed apps (2):"));
        assert!(text.contains("• Settings (com.apple.Preferences)"));

        assert_eq!(
            format_app_list(&AppList::default()),
            "No apps found on the simulator"
        );
    }
}
