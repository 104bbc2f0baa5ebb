use crate::script::{
    Color, Metadata, NodeKind, NodeSpec, Property, SceneScript, Step, TransitionSpec,
};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TemplateType {
    /// Logo grows, rises on a cue, then the title appears
    Intro,
    /// Logo centred in a column layout
    Example,
}

const LOGO: &str = "images/react-logo.png";

pub struct ScriptTemplate;

impl ScriptTemplate {
    pub fn generate(template_type: TemplateType) -> SceneScript {
        match template_type {
            TemplateType::Intro => Self::generate_intro(),
            TemplateType::Example => Self::generate_example(),
        }
    }

    fn generate_intro() -> SceneScript {
        let logo = NodeSpec::new(NodeKind::Image)
            .named("logo")
            .with(Property::Src, LOGO)
            .with(Property::Scale, 2.0);

        let title = NodeSpec::new(NodeKind::Text)
            .named("title")
            .with(Property::Text, "COMPONENTS")
            .with(Property::FontSize, 140.0)
            .with(Property::Y, 100.0)
            .with(Property::Fill, Color::WHITE)
            .with(Property::FontFamily, "JetBrains Mono");

        SceneScript {
            metadata: Self::metadata(
                "Components Intro",
                "Explainer opening synced to the voiceover",
            ),
            steps: vec![
                Step::Add {
                    parent: None,
                    node: logo,
                },
                Step::Animate(TransitionSpec::new("logo", Property::Scale, 3.0, 2.0)),
                Step::WaitUntil {
                    cue: "componentsStart".into(),
                },
                Step::Animate(TransitionSpec::new("logo", Property::Y, -200.0, 1.0)),
                Step::WaitUntil {
                    cue: "componentsSay".into(),
                },
                Step::Add {
                    parent: None,
                    node: title,
                },
            ],
        }
    }

    fn generate_example() -> SceneScript {
        let layout = NodeSpec::new(NodeKind::Container)
            .named("layout")
            .with(Property::Direction, "column")
            .with(Property::AlignItems, "center")
            .child(
                NodeSpec::new(NodeKind::Image)
                    .named("logo")
                    .with(Property::Src, LOGO)
                    .with(Property::Scale, 2.0),
            );

        SceneScript {
            metadata: Self::metadata("Components Example", "Static layout of the logo"),
            steps: vec![Step::Add {
                parent: None,
                node: layout,
            }],
        }
    }

    fn metadata(title: &str, description: &str) -> Metadata {
        Metadata {
            width: Some(1920),
            height: Some(1080),
            audio: Some("voiceover.mp3".into()),
            description: Some(description.into()),
            ..Metadata::new(title)
        }
    }
}
