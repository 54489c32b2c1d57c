use gloo_net::http::Request;
use gloo_render::request_animation_frame;
use log::{info, warn};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::window;
use yew::prelude::*;

use crate::candidate::{parse_deck, shuffled, Candidate};
use crate::classifier::Decision;
use crate::collaborators::{HapticKind, Haptics, StackCallbacks};
use crate::config::EngineConfig;
use crate::deck::{CardFrame, SwipeDeck};
use crate::error::{DeckError, HapticError};
use crate::stack::StackStatus;

const DECK_URL: &str = "assets/recipes.json";
const MAX_CARD_WIDTH: f64 = 360.0;
const CARD_ASPECT: f64 = 1.4;
const MAX_FRAME_SECONDS: f64 = 0.1;

#[derive(PartialEq, Clone)]
enum FetchStatus {
    Idle,
    Loading,
    Error(String),
}

struct BrowserCallbacks {
    notice: Callback<String>,
    refresh: Callback<()>,
}

impl StackCallbacks for BrowserCallbacks {
    fn on_accept(&self, candidate: &Candidate) {
        info!("Cooking '{}'", candidate.id);
        self.notice.emit(format!("Let's cook {}!", candidate.title));
    }

    fn on_favorite_toggled(&self, candidate: &Candidate, favorited: bool) {
        let verb = if favorited { "Saved" } else { "Removed" };
        self.notice.emit(format!("{} {}", verb, candidate.title));
    }

    fn on_inspect(&self, candidate: &Candidate) {
        self.notice.emit(format!("{}: {}", candidate.title, candidate.description));
    }

    fn on_refresh_requested(&self) {
        self.refresh.emit(());
    }
}

struct VibrationHaptics;

impl Haptics for VibrationHaptics {
    fn trigger(&self, kind: HapticKind) -> Result<(), HapticError> {
        let millis = match kind {
            HapticKind::DragStart => 8,
            HapticKind::Decision => 20,
            HapticKind::Favorite => 12,
        };
        let navigator = window()
            .ok_or_else(|| HapticError("no window".to_owned()))?
            .navigator();
        if navigator.vibrate_with_duration(millis) {
            Ok(())
        } else {
            Err(HapticError("vibration rejected".to_owned()))
        }
    }
}

async fn fetch_deck() -> Result<Vec<Candidate>, DeckError> {
    let response = Request::get(DECK_URL)
        .send()
        .await
        .map_err(DeckError::network)?;

    if !response.ok() {
        return Err(DeckError::Network(format!(
            "HTTP {} while fetching {}",
            response.status(),
            DECK_URL
        )));
    }

    let text = response.text().await.map_err(DeckError::network)?;
    let deck = parse_deck(&text)?;
    Ok(shuffled(deck, &mut rand::thread_rng()))
}

fn viewport_config() -> EngineConfig {
    let width = window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|value| value.as_f64())
        .filter(|width| *width > 0.0);

    let Some(width) = width else {
        return EngineConfig::default();
    };
    let card_width = (width * 0.85).min(MAX_CARD_WIDTH);
    EngineConfig::default()
        .with_viewport_width(width)
        .with_card_size(card_width, card_width * CARD_ASPECT)
}

type DeckHandle = Rc<RefCell<Option<SwipeDeck>>>;

#[function_component(App)]
pub fn app() -> Html {
    let status = use_state(|| FetchStatus::Loading);
    let notice = use_state(|| None::<String>);
    let reload = use_state(|| 0u32);
    let frame_clock = use_state(|| 0u64);
    let last_frame = use_mut_ref(|| None::<f64>);
    let redraw = use_force_update();

    let on_notice = {
        let notice = notice.clone();
        Callback::from(move |message: String| notice.set(Some(message)))
    };
    let reload_count = use_mut_ref(|| 0u32);
    let on_refresh = {
        let reload = reload.clone();
        Callback::from(move |_| {
            let mut count = reload_count.borrow_mut();
            *count += 1;
            reload.set(*count);
        })
    };

    let deck: DeckHandle = use_mut_ref(move || {
        let callbacks = Rc::new(BrowserCallbacks {
            notice: on_notice,
            refresh: on_refresh,
        });
        let haptics = Rc::new(VibrationHaptics);
        match SwipeDeck::with_collaborators(viewport_config(), callbacks, haptics) {
            Ok(deck) => Some(deck),
            Err(err) => {
                warn!("Invalid deck configuration: {}", err);
                None
            }
        }
    });

    {
        let deck = deck.clone();
        let status = status.clone();
        let redraw = redraw.clone();
        use_effect_with_deps(
            move |_| {
                status.set(FetchStatus::Loading);
                spawn_local(async move {
                    match fetch_deck().await {
                        Ok(candidates) => {
                            if let Some(deck) = deck.borrow_mut().as_mut() {
                                deck.refresh(candidates);
                            }
                            status.set(FetchStatus::Idle);
                        }
                        Err(err) => status.set(FetchStatus::Error(err.to_string())),
                    }
                    redraw.force_update();
                });
                || ()
            },
            *reload,
        );
    }

    let animating = deck
        .borrow()
        .as_ref()
        .map(SwipeDeck::is_animating)
        .unwrap_or(false);

    {
        let deck = deck.clone();
        let frame_clock = frame_clock.clone();
        let last_frame = last_frame.clone();
        use_effect_with_deps(
            move |(animating, _): &(bool, u64)| {
                let frame = if *animating {
                    Some(request_animation_frame(move |timestamp| {
                        let dt = last_frame
                            .borrow()
                            .map(|previous| {
                                ((timestamp - previous) / 1000.0).clamp(0.0, MAX_FRAME_SECONDS)
                            })
                            .unwrap_or(1.0 / 60.0);
                        *last_frame.borrow_mut() = Some(timestamp);
                        if let Some(deck) = deck.borrow_mut().as_mut() {
                            deck.tick(dt);
                        }
                        frame_clock.set(*frame_clock + 1);
                    }))
                } else {
                    *last_frame.borrow_mut() = None;
                    None
                };
                move || drop(frame)
            },
            (animating, *frame_clock),
        );
    }

    let act = |action: fn(&mut SwipeDeck) -> bool| {
        let deck = deck.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(deck) = deck.borrow_mut().as_mut() {
                if action(deck) {
                    redraw.force_update();
                }
            }
        })
    };
    let on_reject = act(|deck: &mut SwipeDeck| deck.swipe(Decision::Reject));
    let on_accept = act(|deck: &mut SwipeDeck| deck.swipe(Decision::Accept));
    let on_undo = act(SwipeDeck::undo);
    let on_more = act(|deck: &mut SwipeDeck| deck.request_refresh());

    let body = {
        let guard = deck.borrow();
        let rendered = match (&*status, guard.as_ref()) {
            (_, None) => html! { <p class="error">{ "This device cannot show the recipe deck." }</p> },
            (FetchStatus::Loading, _) => html! { <p>{ "Loading recipes…" }</p> },
            (FetchStatus::Error(message), _) => html! { <p class="error">{ message }</p> },
            (FetchStatus::Idle, Some(current)) => match current.status() {
                StackStatus::Loading => html! { <p>{ "Loading recipes…" }</p> },
                StackStatus::Empty => html! {
                    <div class="empty-state">
                        <p>{ "That's every recipe for now." }</p>
                        <button class="refresh" onclick={on_more}>{ "Show me more" }</button>
                    </div>
                },
                StackStatus::Ready => {
                    let mut frames = current.frame();
                    // Bottom card first so the DOM order matches the paint order.
                    frames.reverse();
                    html! {
                        <div class="card-stack">
                            { for frames.iter().map(|frame| render_card(frame, &deck, &redraw)) }
                        </div>
                    }
                }
            },
        };
        rendered
    };

    html! {
        <div class="app-container">
            <main class="content single-column">
                { body }
                if let Some(message) = &*notice {
                    <p class="notice">{ message }</p>
                }
                <div class="deck-actions">
                    <button class="pass" onclick={on_reject}>{ "Pass" }</button>
                    <button class="undo" onclick={on_undo}>{ "Undo" }</button>
                    <button class="cook" onclick={on_accept}>{ "Cook" }</button>
                </div>
            </main>
        </div>
    }
}

fn render_card(frame: &CardFrame<'_>, deck: &DeckHandle, redraw: &UseForceUpdateHandle) -> Html {
    let candidate = frame.candidate;
    let id = candidate.id.clone();
    // The top card is positioned every frame while it moves; easing on top
    // of that would lag behind the pointer.
    let moving = frame.is_top
        && deck
            .borrow()
            .as_ref()
            .map(|d| !d.live().is_at_rest())
            .unwrap_or(false);
    let style = format!(
        "{} transition: {};",
        frame.transform.to_css(),
        if moving { "none" } else { "transform 0.2s ease" }
    );

    let toggle_favorite = {
        let deck = deck.clone();
        let redraw = redraw.clone();
        let id = id.clone();
        Callback::from(move |event: MouseEvent| {
            event.stop_propagation();
            if let Some(deck) = deck.borrow_mut().as_mut() {
                deck.toggle_favorite(&id);
            }
            redraw.force_update();
        })
    };

    let inspect = {
        let deck = deck.clone();
        let id = id.clone();
        Callback::from(move |event: MouseEvent| {
            event.stop_propagation();
            if let Some(deck) = deck.borrow().as_ref() {
                deck.inspect(&id);
            }
        })
    };

    let overlay = frame.overlay.map(|opacity| {
        html! {
            <>
                <span class="badge pass" style={format!("opacity: {:.2};", opacity.pass)}>{ "PASS" }</span>
                <span class="badge cook" style={format!("opacity: {:.2};", opacity.accept)}>{ "COOK" }</span>
            </>
        }
    });

    let content = html! {
        <>
            { for overlay }
            if let Some(image) = &candidate.image {
                <img class="card-image" src={image.clone()} alt={candidate.title.clone()} />
            }
            <p class="card-title">{ &candidate.title }</p>
            <p class="card-description">{ &candidate.description }</p>
            <ul class="card-facts">
                <li>{ candidate.time_label() }</li>
                <li>{ candidate.servings_label() }</li>
                <li>{ candidate.difficulty_label() }</li>
                <li>{ candidate.macros_label() }</li>
            </ul>
            <div class="card-tags">
                { for candidate.tags.iter().map(|tag| html! { <span class="tag">{ tag }</span> }) }
            </div>
            <div class="card-actions">
                <button class={classes!("favorite", frame.is_favorite.then_some("active"))}
                    onclick={toggle_favorite}>
                    { if frame.is_favorite { "♥" } else { "♡" } }
                </button>
                <button class="details" onclick={inspect}>{ "Details" }</button>
            </div>
        </>
    };

    if !frame.is_top {
        let tap = {
            let deck = deck.clone();
            let redraw = redraw.clone();
            let id = id.clone();
            Callback::from(move |_: MouseEvent| {
                if let Some(deck) = deck.borrow_mut().as_mut() {
                    if deck.tap(&id) {
                        redraw.force_update();
                    }
                }
            })
        };
        return html! {
            <div key={id} class="card" style={style} onclick={tap}>{ content }</div>
        };
    }

    let pointer_down = {
        let deck = deck.clone();
        let redraw = redraw.clone();
        let id = id.clone();
        Callback::from(move |event: PointerEvent| {
            if pressed_button(&event) {
                return;
            }
            let started = deck
                .borrow_mut()
                .as_mut()
                .map(|d| {
                    d.pointer_down(
                        &id,
                        event.pointer_id(),
                        event.client_x() as f64,
                        event.client_y() as f64,
                    )
                })
                .unwrap_or(false);
            if !started {
                return;
            }
            event.prevent_default();
            if let Some(target) = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
            {
                let _ = target.set_pointer_capture(event.pointer_id());
            }
            redraw.force_update();
        })
    };

    let pointer_move = {
        let deck = deck.clone();
        let redraw = redraw.clone();
        Callback::from(move |event: PointerEvent| {
            let moved = deck
                .borrow_mut()
                .as_mut()
                .map(|d| {
                    d.pointer_move(
                        event.pointer_id(),
                        event.client_x() as f64,
                        event.client_y() as f64,
                    )
                })
                .unwrap_or(false);
            if moved {
                event.prevent_default();
                redraw.force_update();
            }
        })
    };

    let pointer_up = {
        let deck = deck.clone();
        let redraw = redraw.clone();
        Callback::from(move |event: PointerEvent| {
            let released = deck.borrow_mut().as_mut().and_then(|d| {
                d.pointer_up(
                    event.pointer_id(),
                    event.client_x() as f64,
                    event.client_y() as f64,
                )
            });
            if released.is_some() {
                release_capture(&event);
                redraw.force_update();
            }
        })
    };

    let pointer_cancel = {
        let deck = deck.clone();
        let redraw = redraw.clone();
        Callback::from(move |event: PointerEvent| {
            let cancelled = deck
                .borrow_mut()
                .as_mut()
                .map(|d| d.pointer_cancel(event.pointer_id()))
                .unwrap_or(false);
            if cancelled {
                release_capture(&event);
                redraw.force_update();
            }
        })
    };

    html! {
        <div key={id} class="card top-card swipe-enabled" style={style}
            onpointerdown={pointer_down}
            onpointermove={pointer_move}
            onpointerup={pointer_up}
            onpointercancel={pointer_cancel.clone()}
            onlostpointercapture={pointer_cancel}>
            { content }
        </div>
    }
}

fn release_capture(event: &PointerEvent) {
    if let Some(target) = event
        .target()
        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
    {
        let _ = target.release_pointer_capture(event.pointer_id());
    }
}

fn pressed_button(event: &PointerEvent) -> bool {
    event
        .target()
        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        .and_then(|element| element.closest("button").ok().flatten())
        .is_some()
}
