use std::collections::HashMap;

use codepal_types::ContextSnapshot;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const PROMPT_UNIT_TEST: &str = include_str!("prompt_templates/unit_test.txt");
const PROMPT_FUNCTIONAL_TEST: &str = include_str!("prompt_templates/functional_test.txt");
const PROMPT_UPGRADE_PROJECT: &str = include_str!("prompt_templates/upgrade_project.txt");

/// Stand-in for optional snapshot fields that are empty.
pub const NOT_AVAILABLE: &str = "Not available";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptTemplate {
    UnitTest,
    FunctionalTest,
    UpgradeProject,
}

impl PromptTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            PromptTemplate::UnitTest => "unitTest",
            PromptTemplate::FunctionalTest => "functionalTest",
            PromptTemplate::UpgradeProject => "upgradeProject",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            PromptTemplate::UnitTest => PROMPT_UNIT_TEST,
            PromptTemplate::FunctionalTest => PROMPT_FUNCTIONAL_TEST,
            PromptTemplate::UpgradeProject => PROMPT_UPGRADE_PROJECT,
        }
    }
}

fn or_not_available(value: &str) -> String {
    if value.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        value.to_string()
    }
}

/// Placeholder values taken from a snapshot.
pub fn snapshot_values(snapshot: &ContextSnapshot) -> HashMap<String, String> {
    HashMap::from([
        ("fileName".to_string(), snapshot.display_file_name().to_string()),
        ("language".to_string(), snapshot.language_id.clone()),
        ("content".to_string(), snapshot.full_text.clone()),
        ("projectContext".to_string(), or_not_available(&snapshot.project_summary)),
        (
            "dependencies".to_string(),
            or_not_available(&snapshot.dependency_manifest_text),
        ),
    ])
}

/// Substitutes every `{{name}}` in `body` in one pass.
///
/// Unknown names are left as written, and substituted text is never scanned
/// again, so a file containing `{{language}}` is sent verbatim.
pub fn render_body(body: &str, values: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(body, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Renders `template` against `snapshot`; `extra` adds or overrides values.
pub fn render(
    template: PromptTemplate,
    snapshot: &ContextSnapshot,
    extra: Option<&HashMap<String, String>>,
) -> String {
    let mut values = snapshot_values(snapshot);
    if let Some(extra) = extra {
        values.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    render_body(template.body(), &values)
}

/// The default prompt wrapping a free-form chat message with editor context.
pub fn compose_chat_prompt(snapshot: &ContextSnapshot, text: &str) -> String {
    let language = &snapshot.language_id;

    let selection = if snapshot.has_selection() {
        format!(
            "Sélection actuelle:\n```{}\n{}\n```\n",
            language, snapshot.selected_text
        )
    } else {
        String::new()
    };

    let project = if snapshot.project_summary.is_empty() {
        String::new()
    } else {
        format!("{}\n", snapshot.project_summary)
    };

    let dependencies = if snapshot.has_dependencies() {
        format!(
            "Informations sur les dépendances:\n```\n{}\n```\n",
            snapshot.dependency_manifest_text
        )
    } else {
        String::new()
    };

    format!(
        "Je suis en train de développer dans mon éditeur. Voici le contexte actuel:\n\n\
         Fichier actif: {file}\n\
         Langage: {language}\n\
         Contenu:\n\
         ```{language}\n\
         {content}\n\
         ```\n\n\
         {selection}\n\n\
         {project}\n\
         {dependencies}\n\n\
         Ma question ou demande est:\n\
         {text}\n\n\
         En plus de répondre à ma question:\n\
         1. Si ta réponse contient du code que je pourrais vouloir utiliser, ajoute une action \"Insérer ce code\" après chaque bloc de code significatif\n\
         2. Si tu proposes de créer un nouveau fichier, ajoute une action \"Créer ce fichier\" avec le chemin suggéré\n\
         3. N'hésite pas à proposer des refactorisations ou des améliorations si tu en vois",
        file = snapshot.display_file_name(),
        language = language,
        content = snapshot.full_text,
        selection = selection,
        project = project,
        dependencies = dependencies,
        text = text,
    )
}
