//! Character alias expansion.

/// Titles commonly used with surnames in public-domain fiction.
const TITLES: &[&str] = &["Mr.", "Mrs.", "Miss", "Dr.", "Lord", "Lady"];

/// Expand a character name into the aliases a novel may use for it.
///
/// For "Elizabeth Bennet" this yields the full name, "Elizabeth", "Bennet",
/// and "Mr. Bennet" through "Lady Bennet". Single names get the title forms
/// applied directly. Order is preserved; the primary name comes first.
pub fn aliases_for(name: &str) -> Vec<String> {
    let name = name.trim();
    let mut aliases = vec![name.to_string()];
    let parts: Vec<&str> = name.split_whitespace().collect();

    let title_base = if parts.len() > 1 {
        let first = parts[0];
        let last = parts[parts.len() - 1];
        push_unique(&mut aliases, first.to_string());
        push_unique(&mut aliases, last.to_string());
        last
    } else {
        name
    };

    for title in TITLES {
        push_unique(&mut aliases, format!("{title} {title_base}"));
    }

    aliases
}

fn push_unique(aliases: &mut Vec<String>, alias: String) {
    if !alias.is_empty() && !aliases.contains(&alias) {
        aliases.push(alias);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_expands_to_parts_and_titles() {
        let aliases = aliases_for("Elizabeth Bennet");
        assert_eq!(aliases[0], "Elizabeth Bennet");
        assert!(aliases.contains(&"Elizabeth".to_string()));
        assert!(aliases.contains(&"Bennet".to_string()));
        assert!(aliases.contains(&"Mr. Bennet".to_string()));
        assert!(aliases.contains(&"Lady Bennet".to_string()));
    }

    #[test]
    fn single_name_gets_title_forms() {
        let aliases = aliases_for("Sarah");
        assert!(aliases.contains(&"Miss Sarah".to_string()));
        assert_eq!(aliases[0], "Sarah");
    }

    #[test]
    fn no_duplicate_aliases() {
        let aliases = aliases_for("Sarah Sarah");
        let mut deduped = aliases.clone();
        deduped.dedup();
        assert_eq!(aliases.len(), deduped.len());
    }
}
