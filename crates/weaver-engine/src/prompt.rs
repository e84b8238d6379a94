//! Prompt templates for code generation and editing
//!
//! Every function here is a pure function of its inputs and returns the exact
//! text sent to the model.

use crate::bundle::{MultiFileCode, Variant};
use crate::flows::{EditCodeRequest, EditComponentRequest};
use crate::markers;

const COMPONENT_RULES: &str = "\
- The main component must be a functional component named `App` and should use React hooks.
- Do not include `import React from \"react\";` or any `ReactDOM.render` / `createRoot` call. \
The output should only be the component code itself.";

/// Instruction for generating a fresh bundle from a free-text prompt
pub fn generation_instruction(variant: Variant, prompt: &str) -> String {
    match variant {
        Variant::Component => format!(
            "You are an expert React developer who generates a single React functional component \
and its CSS from a text prompt.

{COMPONENT_RULES}
- Provide the React component code and the CSS code as separate strings in the output.

Text Prompt: {prompt}"
        ),
        Variant::MultiFile => format!(
            "You are an expert web developer who builds small, self-contained web pages from a \
text prompt.

- Provide the HTML markup, the CSS and the JavaScript as three separate strings in the output.
- The HTML is inserted into an existing <body>: do not include <html>, <head> or <body> tags, \
and do not inline <style> or <script> elements.
- The JavaScript runs as an ES module after the markup is in the document.
- Use only the browser platform; no external libraries.

Text Prompt: {prompt}"
        ),
    }
}

/// Serialize a multi-file bundle into one text block, each section framed by
/// its delimiter pair, in HTML, CSS, JS order.
pub fn serialize_existing_code(code: &MultiFileCode) -> String {
    format!(
        "\n{}\n\n{}\n\n{}\n",
        markers::HTML.wrap(&code.html),
        markers::CSS.wrap(&code.css),
        markers::JS.wrap(&code.js),
    )
}

/// The user's edit prompt followed by the delimiter contract the reply must
/// follow.
pub fn edit_instruction(prompt: &str) -> String {
    format!(
        "{prompt}

Your response MUST be structured with the following delimiters for each language block:
{html_start}
... html code ...
{html_end}

{css_start}
... css code ...
{css_end}

{js_start}
... javascript code ...
{js_end}

If a section is not present or not modified, include the delimiters with the original content for that section.
",
        html_start = markers::HTML_START,
        html_end = markers::HTML_END,
        css_start = markers::CSS_START,
        css_end = markers::CSS_END,
        js_start = markers::JS_START,
        js_end = markers::JS_END,
    )
}

/// Full instruction for the multi-file edit flow
pub fn edit_code_instruction(request: &EditCodeRequest) -> String {
    format!(
        "You are a web development expert. You will modify the existing HTML, CSS and JavaScript \
based on the user's instructions.

Existing Code:
{existing}

Instructions:
{prompt}

Return the complete, modified code as a single string, keeping every section inside its \
delimiters even if that section is unchanged.
",
        existing = request.existing_code,
        prompt = request.prompt,
    )
}

/// Full instruction for the component edit flow
pub fn edit_component_instruction(request: &EditComponentRequest) -> String {
    format!(
        "You are a web development expert specializing in React. You will modify the existing \
React component and CSS based on the user's instructions.

Existing React Component:
{component}

Existing CSS:
{css}

Instructions:
{prompt}

Return the complete, modified code for both the React component and the CSS, even if one of \
them is unchanged.
{COMPONENT_RULES}
",
        component = request.existing_component,
        css = request.existing_css,
        prompt = request.prompt,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_embeds_prompt() {
        let text = generation_instruction(Variant::Component, "a todo list");
        assert!(text.ends_with("Text Prompt: a todo list"));
        assert!(text.contains("named `App`"));

        let text = generation_instruction(Variant::MultiFile, "a clock");
        assert!(text.contains("three separate strings"));
        assert!(text.ends_with("Text Prompt: a clock"));
    }

    #[test]
    fn test_serialize_orders_sections() {
        let code = MultiFileCode::new("<p>hi</p>", "p { color: red; }", "console.log(1);");
        let text = serialize_existing_code(&code);

        let html = text.find(markers::HTML_START).unwrap();
        let css = text.find(markers::CSS_START).unwrap();
        let js = text.find(markers::JS_START).unwrap();
        assert!(html < css && css < js);
        assert!(text.contains("<!-- HTML_CODE_START -->\n<p>hi</p>\n<!-- HTML_CODE_END -->"));
    }

    #[test]
    fn test_edit_instruction_names_every_marker() {
        let text = edit_instruction("make it blue");
        assert!(text.starts_with("make it blue\n"));
        for marker in [
            markers::HTML_START,
            markers::HTML_END,
            markers::CSS_START,
            markers::CSS_END,
            markers::JS_START,
            markers::JS_END,
        ] {
            assert!(text.contains(marker), "missing {marker}");
        }
    }

    #[test]
    fn test_edit_component_instruction_includes_sources() {
        let request = EditComponentRequest {
            existing_component: "function App() { return <div/>; }".to_string(),
            existing_css: ".a {}".to_string(),
            prompt: "add a button".to_string(),
        };
        let text = edit_component_instruction(&request);
        assert!(text.contains("function App()"));
        assert!(text.contains(".a {}"));
        assert!(text.contains("Instructions:\nadd a button"));
    }
}
