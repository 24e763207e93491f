//! Instance presentation
//!
//! An instance is first assembled into a tree of labelled [`Node`]s, then
//! written out by a single recursive printer that indents each level with a
//! tab. Empty sections are left out of the tree.

use hubctl_client::SecretResolver;
use hubctl_core::domain::instance::{PlatformRef, Provides, StackInstance};
use hubctl_core::domain::operation::InflightOperation;
use hubctl_core::domain::status::{CommitStatus, ComponentStatus};
use std::io::{self, Write};

use crate::render::{RenderError, ValueRenderer};

const K8S_REF_LABEL: &str = "stack-k8s-aws ref";

/// Labelled line of output with nested lines below it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub text: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn leaf(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn branch(text: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            text: text.into(),
            children,
        }
    }
}

/// What to include in a rendered document
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    pub show_secrets: bool,
    pub show_logs: bool,
}

/// Assembles instance documents and collects render failures across them
pub struct Formatter<'a> {
    renderer: ValueRenderer<'a>,
    show_logs: bool,
}

impl<'a> Formatter<'a> {
    pub fn new(secrets: &'a dyn SecretResolver, options: FormatOptions) -> Self {
        Self {
            renderer: ValueRenderer::new(secrets, options.show_secrets),
            show_logs: options.show_logs,
        }
    }

    /// Build the document tree of one instance
    pub async fn instance(&mut self, instance: &StackInstance) -> Node {
        let resource = hubctl_client::paths::instance(&instance.id);
        let mut fields = Vec::new();

        if !instance.tags.is_empty() {
            fields.push(Node::leaf(format!("Tags: {}", instance.tags.join(", "))));
        }
        let env = &instance.environment;
        if !env.name.is_empty() {
            fields.push(Node::leaf(format!(
                "Environment: {}",
                identity(&env.name, &env.domain, &env.id)
            )));
        }
        if let Some(platform) = instance.platform.as_ref().filter(|p| !p.name.is_empty()) {
            fields.push(platform_node(platform));
        }
        if !instance.stack.name.is_empty() {
            fields.push(Node::leaf(format!(
                "Stack: {} [{}]",
                instance.stack.name, instance.stack.id
            )));
        }
        if !instance.template.name.is_empty() {
            fields.push(Node::leaf(format!(
                "Template: {} [{}]",
                instance.template.name, instance.template.id
            )));
        }
        if !instance.components_enabled.is_empty() {
            fields.push(Node::leaf(format!(
                "Components: {}",
                instance.components_enabled.join(", ")
            )));
        }
        if !instance.verbs.is_empty() {
            fields.push(Node::leaf(format!("Verbs: {}", instance.verbs.join(", "))));
        }

        let git = &instance.git_remote;
        if git.public.is_some() || git.has_refs() {
            let mut refs = Vec::new();
            if let Some(r) = git.template_ref() {
                refs.push(Node::leaf(format!("Ref: {}", r)));
            }
            if let Some(r) = git.k8s_ref() {
                refs.push(Node::leaf(format!("{}: {}", K8S_REF_LABEL, r)));
            }
            fields.push(Node::branch(
                format!("Git: {}", git.public.as_deref().unwrap_or_default()),
                refs,
            ));
        }

        if let Some(node) = list_node("State files:", &instance.state_files) {
            fields.push(node);
        }
        if let Some(node) = provides_node(&instance.provides) {
            fields.push(node);
        }

        if !instance.outputs.is_empty() {
            let mut lines = Vec::with_capacity(instance.outputs.len());
            for output in &instance.outputs {
                lines.push(Node::leaf(self.renderer.output(&resource, output).await));
            }
            fields.push(Node::branch("Outputs:", lines));
        }

        if !instance.parameters.is_empty() {
            let mut parameters: Vec<_> = instance.parameters.iter().collect();
            parameters.sort_by(|a, b| (&a.component, &a.name).cmp(&(&b.component, &b.name)));
            let mut lines = Vec::with_capacity(parameters.len());
            for parameter in parameters {
                lines.push(Node::leaf(self.renderer.parameter(&resource, parameter).await));
            }
            fields.push(Node::branch("Parameters:", lines));
        }

        let status = &instance.status;
        if !status.status.is_empty() {
            fields.push(Node::leaf(format!("Status: {}", status.status)));
        }
        if let Some(commit) = status.template.as_ref().filter(|c| !c.commit.is_empty()) {
            fields.push(Node::leaf(commit_line("Template deployed", commit)));
        }
        if let Some(commit) = status.k8s.as_ref().filter(|c| !c.commit.is_empty()) {
            fields.push(Node::leaf(commit_line("Kubernetes deployed", commit)));
        }
        if !status.components.is_empty() {
            fields.push(Node::branch(
                "Components Status:",
                status.components.iter().map(component_node).collect(),
            ));
        }

        if !instance.inflight_operations.is_empty() {
            fields.push(Node::branch(
                "Inflight Operations:",
                instance
                    .inflight_operations
                    .iter()
                    .map(|op| operation_node(op, self.show_logs))
                    .collect(),
            ));
        }

        let mut title = identity(&instance.name, &instance.domain, &instance.id);
        if !instance.description.is_empty() {
            title.push_str(" - ");
            title.push_str(&instance.description);
        }
        Node::branch(title, fields)
    }

    pub fn into_errors(self) -> Vec<RenderError> {
        self.renderer.into_errors()
    }
}

fn identity(name: &str, domain: &str, id: &str) -> String {
    format!("{} / {} [{}]", name, domain, id)
}

fn platform_node(platform: &PlatformRef) -> Node {
    let mut children = Vec::new();
    if let Some(node) = list_node("State files:", &platform.state_files) {
        children.push(node);
    }
    if let Some(node) = provides_node(&platform.provides) {
        children.push(node);
    }
    Node::branch(
        format!(
            "Platform: {}",
            identity(&platform.name, &platform.domain, &platform.id)
        ),
        children,
    )
}

fn list_node(label: &str, items: &[String]) -> Option<Node> {
    if items.is_empty() {
        return None;
    }
    Some(Node::branch(
        label,
        items.iter().map(|item| Node::leaf(item.as_str())).collect(),
    ))
}

fn provides_node(provides: &Provides) -> Option<Node> {
    if provides.is_empty() {
        return None;
    }
    Some(Node::branch(
        "Provides:",
        provides
            .iter()
            .map(|(capability, by)| Node::leaf(format!("{} => {}", capability, by.join(", "))))
            .collect(),
    ))
}

fn commit_line(label: &str, commit: &CommitStatus) -> String {
    format!(
        "{}: {} {} {} {} {}",
        label,
        commit.short_commit(),
        commit.git_ref,
        commit.author,
        commit.date,
        commit.subject
    )
}

fn component_node(component: &ComponentStatus) -> Node {
    let mut text = component.name.clone();
    if !component.version.is_empty() {
        text.push_str(&format!(" [{}]", component.version));
    }
    text.push_str(&format!(" - {}", component.status));
    if !component.message.is_empty() {
        text.push_str(&format!(": {}", component.message));
    }
    Node::branch(
        text,
        component
            .outputs
            .iter()
            .map(|(k, v)| Node::leaf(format!("{}: {}", k, v)))
            .collect(),
    )
}

fn operation_node(op: &InflightOperation, show_logs: bool) -> Node {
    let mut text = format!("Operation: {} - {}", op.operation, op.status);
    if let Some(timestamp) = op.timestamp {
        text.push_str(&format!(" {}", timestamp.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    if !op.initiator.is_empty() {
        text.push_str(&format!(" by {}", op.initiator));
    }
    if !op.description.is_empty() {
        text.push_str(&format!(" ({})", op.description));
    }
    text.push(' ');
    text.push_str(&op.id);

    let mut children = Vec::new();
    if !op.platform_domain.is_empty() {
        children.push(Node::leaf(format!(
            "Platform: {}",
            op.platform_domain.join(", ")
        )));
    }
    if !op.options.is_empty() {
        let options = serde_json::to_string(&op.options).unwrap_or_default();
        children.push(Node::leaf(format!("Options: {}", options)));
    }
    if !op.phases.is_empty() {
        children.push(Node::branch(
            "Phases:",
            op.phases
                .iter()
                .map(|p| Node::leaf(format!("{} - {}", p.phase, p.status)))
                .collect(),
        ));
    }
    if show_logs && !op.logs.is_empty() {
        children.push(Node::branch(
            "Logs:",
            op.logs.lines().map(Node::leaf).collect(),
        ));
    }
    Node::branch(text, children)
}

/// Write a node and everything below it, one tab per level
pub fn write_node(out: &mut impl Write, node: &Node, depth: usize) -> io::Result<()> {
    writeln!(out, "{}{}", "\t".repeat(depth), node.text)?;
    for child in &node.children {
        write_node(out, child, depth + 1)?;
    }
    Ok(())
}

/// Write the instance listing followed by any render failures
pub fn write_document(
    out: &mut impl Write,
    instances: &[Node],
    errors: &[RenderError],
) -> io::Result<()> {
    if instances.is_empty() {
        writeln!(out, "No Stack Instances")?;
    } else {
        writeln!(out, "Stack Instances:")?;
        for node in instances {
            writeln!(out)?;
            write_node(out, node, 1)?;
        }
    }
    write_errors(out, "Errors encountered:", errors)
}

/// Write the trailer listing render failures, if there were any
pub fn write_errors(out: &mut impl Write, heading: &str, errors: &[RenderError]) -> io::Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{}", heading)?;
    for error in errors {
        writeln!(out, "\t{}", error)?;
    }
    Ok(())
}
