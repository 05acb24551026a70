//! prompt improver demo: one text area, one button, one result card.
//!
//! - type into the box (enter = newline, ctrl+enter = submit, backspace = delete).
//! - the button reads "Improving..." and is disabled while a request is in flight
//!   or while the input is blank.
//! - the result card only appears once there is output.
//!
//! env:
//!   LLM_BACKEND      (default openai)
//!   LLM_BASE_URL     (default https://api.openai.com)
//!   LLM_MODEL        (default gpt-5)
//!   LLM_API_KEY      (falls back to OPENAI_API_KEY)

use async_trait::async_trait;
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::prelude::*;
use bevy_prompt_improver::{
    Completer, Completion, CompletionError, ImproveFailed, ImproverSet, LLMError, PromptForm,
    PromptImproved, PromptImproverPlugin, ProviderConfig, submit_prompt,
};

const BTN_IDLE: Color = Color::srgb(0.16, 0.38, 0.85);
const BTN_HOVER: Color = Color::srgb(0.22, 0.45, 0.92);
const BTN_DISABLED: Color = Color::srgb(0.25, 0.25, 0.3);

// ---------------------- ui tags ----------------------

#[derive(Component)]
struct InputText;
#[derive(Component)]
struct SubmitBtn;
#[derive(Component)]
struct SubmitLabel;
#[derive(Component)]
struct OutputCard;
#[derive(Component)]
struct OutputText;

/// the form entity every widget reads from.
#[derive(Resource, Clone, Copy)]
struct FormEntity(Entity);

// ---------------------- provider ----------------------

/// stands in when the provider cannot be built, so the form still settles.
struct Unavailable(String);

#[async_trait]
impl Completion for Unavailable {
    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        Err(CompletionError::Provider(LLMError::InvalidRequest(self.0.clone())))
    }
}

fn install_completer(mut commands: Commands) {
    let cfg = ProviderConfig::from_env();
    let completer = match cfg.build() {
        Ok(provider) => Completer::from_provider(provider),
        Err(err) => {
            error!(target: "improver_demo", "provider unavailable: {}", err);
            Completer::new(Unavailable(err.to_string()))
        }
    };
    commands.insert_resource(completer);
}

// ---------------------- main ----------------------

fn main() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    App::new()
        .insert_resource(ClearColor(Color::srgb_u8(18, 18, 20)))
        .add_plugins(DefaultPlugins)
        .add_plugins(PromptImproverPlugin)
        .add_systems(Startup, (install_completer, setup).chain())
        .add_systems(Update, (handle_text_input, btn_submit))
        .add_systems(
            Update,
            (on_improved, on_failed, refresh_form_view)
                .chain()
                .after(ImproverSet::Drain),
        )
        .run();
}

// ---------------------- setup ui ----------------------

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d::default());

    let form = commands.spawn(PromptForm::default()).id();
    commands.insert_resource(FormEntity(form));

    let title = TextFont { font_size: 26.0, ..default() };
    let body = TextFont { font_size: 16.0, ..default() };
    let heading = TextFont { font_size: 20.0, ..default() };

    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                padding: UiRect::all(Val::Px(24.0)),
                ..default()
            },
            BackgroundColor(Color::NONE),
        ))
        .with_children(|root| {
            // card
            root.spawn((
                Node {
                    width: Val::Px(720.0),
                    height: Val::Auto,
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(16.0),
                    padding: UiRect::all(Val::Px(24.0)),
                    ..default()
                },
                BackgroundColor(Color::srgb(0.10, 0.10, 0.12)),
            ))
            .with_children(|card| {
                card.spawn((Text::new("Copilot Prompt Improver"), title, TextColor(Color::WHITE)));
                card.spawn((
                    Text::new(
                        "Enter your initial Copilot prompt, and we'll help you make it more specific and aligned with SMART goals.",
                    ),
                    body.clone(),
                    TextColor(Color::srgb_u8(200, 200, 200)),
                ));

                // text area
                card.spawn((
                    Node {
                        width: Val::Percent(100.0),
                        min_height: Val::Px(96.0),
                        padding: UiRect::all(Val::Px(8.0)),
                        border: UiRect::all(Val::Px(1.0)),
                        ..default()
                    },
                    BorderColor(Color::srgb(0.3, 0.3, 0.35)),
                    BackgroundColor(Color::srgb(0.06, 0.06, 0.08)),
                ))
                .with_children(|area| {
                    area.spawn((Text::new(""), body.clone(), TextColor(Color::WHITE), InputText));
                });

                // submit
                card.spawn((
                    Button,
                    Node {
                        width: Val::Px(160.0),
                        height: Val::Px(36.0),
                        align_items: AlignItems::Center,
                        justify_content: JustifyContent::Center,
                        ..default()
                    },
                    BackgroundColor(BTN_DISABLED),
                    SubmitBtn,
                ))
                .with_children(|b| {
                    b.spawn((Text::new(""), body.clone(), TextColor(Color::WHITE), SubmitLabel));
                });

                // result (hidden until there is output)
                card.spawn((
                    Node {
                        display: Display::None,
                        flex_direction: FlexDirection::Column,
                        row_gap: Val::Px(8.0),
                        margin: UiRect::top(Val::Px(8.0)),
                        ..default()
                    },
                    OutputCard,
                ))
                .with_children(|out| {
                    out.spawn((Text::new("Improved Prompt:"), heading, TextColor(Color::WHITE)));
                    out.spawn((
                        Node { padding: UiRect::all(Val::Px(12.0)), ..default() },
                        BackgroundColor(Color::srgb(0.9, 0.9, 0.92)),
                    ))
                    .with_children(|p| {
                        p.spawn((Text::new(""), body.clone(), TextColor(Color::BLACK), OutputText));
                    });
                });
            });
        });
}

// ---------------------- input & button ----------------------

fn handle_text_input(
    mut commands: Commands,
    mut ev_kbd: EventReader<KeyboardInput>,
    keys: Res<ButtonInput<KeyCode>>,
    form_entity: Res<FormEntity>,
    mut forms: Query<&mut PromptForm>,
) {
    let Ok(mut form) = forms.get_mut(form_entity.0) else {
        return;
    };
    let ctrl = keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);

    for ev in ev_kbd.read() {
        if !ev.state.is_pressed() {
            continue;
        }
        match &ev.logical_key {
            Key::Enter if ctrl => {
                if form.can_submit() {
                    info!(target: "improver_demo", "ctrl+enter -> submit (len={})", form.input().len());
                    submit_prompt(&mut commands, form_entity.0);
                }
            }
            Key::Enter => form.input_mut().push('\n'),
            Key::Backspace => {
                form.input_mut().pop();
            }
            _ if ctrl => {}
            _ => {
                if let Some(txt) = &ev.text {
                    let s = txt.replace(['\r', '\n'], "");
                    if !s.is_empty() {
                        form.input_mut().push_str(&s);
                    }
                }
            }
        }
    }
}

fn btn_submit(
    mut commands: Commands,
    form_entity: Res<FormEntity>,
    forms: Query<&PromptForm>,
    q: Query<&Interaction, (Changed<Interaction>, With<SubmitBtn>)>,
) {
    let Ok(form) = forms.get(form_entity.0) else {
        return;
    };
    for i in &q {
        // disabled button: clicks do nothing
        if matches!(i, Interaction::Pressed) && form.submit_enabled() {
            info!(target: "improver_demo", "submit clicked (len={})", form.input().len());
            submit_prompt(&mut commands, form_entity.0);
        }
    }
}

// ---------------------- results ----------------------

fn on_improved(mut ev: EventReader<PromptImproved>) {
    for PromptImproved { entity, text } in ev.read() {
        info!(target: "improver_demo", "improved (entity={:?}, len={})", entity, text.len());
    }
}

fn on_failed(mut ev: EventReader<ImproveFailed>) {
    for ImproveFailed { entity, error } in ev.read() {
        warn!(target: "improver_demo", "improve failed (entity={:?}): {}", entity, error);
    }
}

// ---------------------- view refresh ----------------------

fn refresh_form_view(
    form_entity: Res<FormEntity>,
    forms: Query<Ref<PromptForm>>,
    mut sets: ParamSet<(
        Query<&mut Text, With<InputText>>,
        Query<&mut Text, With<SubmitLabel>>,
        Query<&mut Text, With<OutputText>>,
    )>,
    mut q_btn: Query<(&Interaction, &mut BackgroundColor), With<SubmitBtn>>,
    mut q_card: Query<&mut Node, With<OutputCard>>,
) {
    let Ok(form) = forms.get(form_entity.0) else {
        return;
    };

    // button color tracks hover every frame; text only when the form changed
    if let Ok((i, mut bg)) = q_btn.single_mut() {
        bg.0 = match (form.submit_enabled(), i) {
            (false, _) => BTN_DISABLED,
            (true, Interaction::Hovered | Interaction::Pressed) => BTN_HOVER,
            (true, Interaction::None) => BTN_IDLE,
        };
    }

    if !form.is_changed() {
        return;
    }
    if let Ok(mut t) = sets.p0().single_mut() {
        t.0 = if form.input().is_empty() {
            "Enter your initial Copilot prompt here... |".to_string()
        } else {
            format!("{} |", form.input())
        };
    }
    if let Ok(mut t) = sets.p1().single_mut() {
        t.0 = form.submit_label().to_string();
    }
    if let Ok(mut t) = sets.p2().single_mut() {
        t.0 = form.output().to_string();
    }
    if let Ok(mut node) = q_card.single_mut() {
        node.display = if form.output_visible() { Display::Flex } else { Display::None };
    }
}
