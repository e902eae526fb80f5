//! REPL line parsing.
//!
//! `add-job desc="Software Engineer" type=salary amount=120000 period=annually`
//! Bare words fill the action's fields in table order, so
//! `remove-deduction 1` and `status J` work too.

use taxsync_application::actions::{Binding, Fields};

/// Splits a line on whitespace, honouring single and double quotes.
pub fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_token = true;
            }
            None if ch.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(ch);
                in_token = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("Unclosed {} quote", q));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Maps the arguments after the command name onto `binding`'s fields.
pub fn fields(binding: &Binding, args: &[String]) -> Result<Fields, String> {
    let mut fields = Fields::new();
    let mut positional = Vec::new();

    for arg in args {
        match arg.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                if !known(binding, key) {
                    return Err(format!("'{}' does not take a '{}' field", binding.name, key));
                }
                fields.insert(key.to_string(), value.to_string());
            }
            _ => positional.push(arg.clone()),
        }
    }

    let open: Vec<&str> = binding
        .required
        .iter()
        .chain(binding.optional)
        .copied()
        .filter(|name| !fields.contains_key(*name))
        .collect();
    let mut open = open.into_iter();
    for value in positional {
        match open.next() {
            Some(name) => {
                fields.insert(name.to_string(), value);
            }
            None => return Err(format!("Unexpected argument '{}'", value)),
        }
    }
    Ok(fields)
}

fn known(binding: &Binding, key: &str) -> bool {
    binding.required.contains(&key) || binding.optional.contains(&key)
}

/// Usage string, e.g. `add-job <desc> <type> <amount> <period> [hours]`.
pub fn usage(binding: &Binding) -> String {
    let mut usage = binding.name.to_string();
    for name in binding.required {
        usage.push_str(&format!(" <{}>", name));
    }
    for name in binding.optional {
        usage.push_str(&format!(" [{}]", name));
    }
    usage
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxsync_application::Action;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(
            tokenize(r#"add-job desc="Software Engineer" type=salary"#).unwrap(),
            strings(&["add-job", "desc=Software Engineer", "type=salary"])
        );
        assert_eq!(
            tokenize("add-deduction 'Mortgage interest'  8000").unwrap(),
            strings(&["add-deduction", "Mortgage interest", "8000"])
        );
        assert_eq!(tokenize(r#"x """#).unwrap(), strings(&["x", ""]));
        assert!(tokenize("status \"J").is_err());
        assert!(tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn test_positional_fill_table_order() {
        let binding = Action::AddJob.binding();
        let fields = fields(
            binding,
            &strings(&["amount=50", "Contractor", "hourly", "biweekly", "20"]),
        )
        .unwrap();

        assert_eq!(fields["desc"], "Contractor");
        assert_eq!(fields["type"], "hourly");
        assert_eq!(fields["amount"], "50");
        assert_eq!(fields["period"], "biweekly");
        assert_eq!(fields["hours"], "20");
    }

    #[test]
    fn test_rejects_unknown_and_extra_arguments() {
        let binding = Action::RemoveJob.binding();
        assert!(fields(binding, &strings(&["color=red"])).is_err());
        assert!(fields(binding, &strings(&["0", "1"])).is_err());
        assert_eq!(fields(binding, &strings(&["0"])).unwrap()["index"], "0");
    }

    #[test]
    fn test_usage() {
        assert_eq!(
            usage(Action::AddJob.binding()),
            "add-job <desc> <type> <amount> <period> [hours]"
        );
        assert_eq!(usage(Action::Calculate.binding()), "calculate");
    }
}
