use crate::cli::OutputFormat;
use crate::config::Scope;
use crate::fill::FillResult;
use crate::rules::factory::Registry;
use crate::rules::FieldPlan;
use serde_json::{Map, Value};

/// Render filled documents. Several documents are keyed by their source path.
pub fn render_documents(result: &FillResult, format: OutputFormat) -> String {
    if format == OutputFormat::Lines {
        return result
            .documents
            .iter()
            .map(|d| d.value.to_string())
            .collect::<Vec<_>>()
            .join("\n");
    }

    let output = match result.documents.as_slice() {
        [single] => single.value.clone(),
        documents => Value::Object(
            documents
                .iter()
                .map(|d| (d.source.display().to_string(), d.value.clone()))
                .collect::<Map<String, Value>>(),
        ),
    };

    match format {
        OutputFormat::Pretty => format!("{:#}", output),
        _ => output.to_string(),
    }
}

/// Print filled documents to stdout and a summary line to stderr.
pub fn print_documents(result: &FillResult, format: OutputFormat) {
    println!("{}", render_documents(result, format));
    eprintln!(
        "\x1b[32m✓\x1b[0m Filled {} document{} ({} types loaded)",
        result.documents.len(),
        if result.documents.len() == 1 { "" } else { "s" },
        result.registry.len()
    );
}

/// Print every registered type with each field's category and effective rule.
pub fn print_check(registry: &Registry) {
    for registration in registry.types() {
        let type_rule = if registration.rule().is_some() {
            "\x1b[36mtype rule\x1b[0m"
        } else {
            "\x1b[90mno type rule\x1b[0m"
        };
        println!("\n\x1b[4m{}\x1b[0m  {}", registration.name(), type_rule);

        for plan in registration.fields() {
            let kind = match (&plan.nested, &plan.nested_elements) {
                (Some(nested), _) => format!("-> {}", nested),
                (None, Some(elements)) => format!("-> [{}]", elements),
                (None, None) => plan.kind.as_str().to_string(),
            };
            println!(
                "  {:<20} \x1b[90m{:<12}\x1b[0m {}",
                plan.name,
                kind,
                describe_plan(plan)
            );
        }
    }

    println!(
        "\n\x1b[32m✓\x1b[0m \x1b[1m{} type{} loaded\x1b[0m",
        registry.len(),
        if registry.len() == 1 { "" } else { "s" }
    );
}

/// Short description of what happens to the field when it is absent.
pub fn describe_plan(plan: &FieldPlan) -> String {
    let Some(ref rule) = plan.rule else {
        return "no rule, null".to_string();
    };

    let scope = match rule.scope {
        Scope::Type => "type rule",
        Scope::Field => "field rule",
    };

    if rule.exclude {
        return format!("{}, excluded", scope);
    }
    if let Some(custom) = rule.custom() {
        return format!("{}, custom {:?}", scope, custom);
    }

    let outcome = crate::rules::resolve(plan.kind, Some(rule), Default::default()).to_value();
    format!("{}, {}", scope, outcome)
}
