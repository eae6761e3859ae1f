//! HTML binding of [`SiteView`]. No data decisions are made here.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use super::view::{Media, SiteView, Slide};
use crate::carousel::{Track, TrackSnapshot};
use crate::viewer::ViewerSnapshot;

const CSS: &str = r#"
*{box-sizing:border-box}body{margin:0;font-family:system-ui,sans-serif;color:#1a1a1a}
section{padding:4rem 1.5rem;max-width:1200px;margin:0 auto}
.highlight{color:#e4405f}
.slider{overflow:hidden}.slider-track{display:flex;gap:24px;transition:transform .5s ease}
.content-item{flex:0 0 calc(50% - 12px)}
@media (max-width:968px){.content-item{flex:0 0 100%}}
.video-container iframe,.video-container video,.image-container img{width:100%;aspect-ratio:16/9;object-fit:cover;border:0}
.dots{display:flex;gap:.5rem;justify-content:center}.dot{width:10px;height:10px;border-radius:50%;background:#ccc;border:0;padding:0}
.dot.active{background:#1a1a1a}
.timeline-item{border-left:2px solid #1a1a1a;padding-left:1rem;margin-bottom:1.5rem}
"#;

/// Drives the server-side viewer session: creates it for the real viewport,
/// forwards navigation and polls so auto-advance shows up.
const JS: &str = r#"
(function () {
  const root = document.querySelector('[data-viewer]');
  if (!root) return;
  const period = Number(root.dataset.autoAdvanceMs) || 5000;
  let id = null;

  function itemWidth(track) {
    const first = document.querySelector('#' + track + '-track .content-item');
    return first ? first.offsetWidth : null;
  }

  function apply(snapshot) {
    ['video', 'image'].forEach(function (track) {
      const state = snapshot[track];
      const el = document.getElementById(track + '-track');
      const width = itemWidth(track);
      if (el && width !== null) {
        el.style.transform = 'translateX(-' + state.index * (width + 24) + 'px)';
      }
      const dots = document.getElementById(track + '-dots');
      if (dots) {
        dots.innerHTML = state.dots.map(function (d) {
          return '<button class="dot' + (d.active ? ' active' : '') + '" data-track="' + track + '" data-index="' + d.index + '"></button>';
        }).join('');
      }
    });
  }

  function call(method, path, body) {
    return fetch(path, {
      method: method,
      headers: { 'Content-Type': 'application/json' },
      body: body ? JSON.stringify(body) : undefined
    }).then(function (r) { return r.ok ? r.json() : null; })
      .then(function (s) { if (s) apply(s); });
  }

  fetch('/api/viewer', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ viewportWidth: window.innerWidth })
  }).then(function (r) { return r.ok ? r.json() : null; }).then(function (s) {
    if (!s) return;
    id = s.id;
    apply(s);
    setInterval(function () { call('GET', '/api/viewer/' + id); }, period);
  });

  document.addEventListener('click', function (e) {
    if (!id) return;
    const t = e.target;
    if (t.dataset.direction) {
      call('POST', '/api/viewer/' + id + '/slide', { track: t.dataset.track, direction: Number(t.dataset.direction) });
    } else if (t.classList.contains('dot')) {
      call('POST', '/api/viewer/' + id + '/goto', { track: t.dataset.track, index: Number(t.dataset.index) });
    }
  });

  let resizeTimer;
  window.addEventListener('resize', function () {
    clearTimeout(resizeTimer);
    resizeTimer = setTimeout(function () {
      if (id) call('POST', '/api/viewer/' + id + '/resize', { viewportWidth: window.innerWidth });
    }, 250);
  });

  window.addEventListener('pagehide', function () {
    if (id) fetch('/api/viewer/' + id, { method: 'DELETE', keepalive: true });
  });
})();
"#;

fn track_name(track: Track) -> &'static str {
    match track {
        Track::Video => "video",
        Track::Image => "image",
    }
}

fn render_media(media: &Media) -> Markup {
    match media {
        Media::Embed { src } => html! {
            div class="video-container" {
                iframe src=(src) frameborder="0" allowfullscreen loading="lazy" {}
            }
        },
        Media::Video { src, poster } => html! {
            div class="video-container" {
                video controls preload="none" poster=[poster] {
                    source src=(src) type="video/mp4";
                }
            }
        },
        Media::Image { src, alt } => html! {
            div class="image-container" {
                img src=(src) alt=(alt) loading="lazy";
            }
        },
    }
}

fn render_slide(slide: &Slide) -> Markup {
    html! {
        div class="content-item" {
            @if let Some(media) = &slide.media {
                (render_media(media))
            }
            div class="content-info" {
                h4 { (slide.title) }
                p { (slide.description) }
            }
        }
    }
}

fn render_track(heading: &str, slides: &[Slide], state: &TrackSnapshot) -> Markup {
    let name = track_name(state.track);
    html! {
        div class="portfolio-category" {
            h3 { (heading) }
            div class="slider" {
                button class="slider-btn prev" data-track=(name) data-direction="-1" { "‹" }
                div class="slider-track" id={ (name) "-track" } {
                    @for slide in slides {
                        (render_slide(slide))
                    }
                }
                button class="slider-btn next" data-track=(name) data-direction="1" { "›" }
            }
            div class="dots" id={ (name) "-dots" } {
                @for dot in &state.dots {
                    button class=(if dot.active { "dot active" } else { "dot" })
                        data-track=(name) data-index=(dot.index) {}
                }
            }
        }
    }
}

fn render_hero(view: &SiteView) -> Markup {
    html! {
        section id="home" class="hero" {
            h1 id="hero-headline" { (view.hero.headline) }
            p id="hero-subtitle" { (view.hero.subtitle) }
            div class="hero-buttons" {
                a id="hero-cta-primary" class="btn btn-primary" href="#portfolio" { (view.hero.cta_primary) }
                a id="hero-cta-secondary" class="btn btn-secondary" href="#contact" { (view.hero.cta_secondary) }
            }
        }
    }
}

fn render_about(view: &SiteView) -> Markup {
    let fallback = format!("this.onerror=null;this.src='{}'", view.about.profile_image_fallback);
    html! {
        section id="about" class="about" {
            img id="profile-image" src=(view.about.profile_image) alt="Profile" onerror=(fallback);
            p id="about-lead" class="lead" { (view.about.lead_text) }
            p id="about-bio" { (view.about.bio_text) }
            div id="stats-container" class="stats" {
                @for stat in &view.stats {
                    div class="stat-item" {
                        span class="stat-number" { (stat.value) }
                        span class="stat-label" { (stat.label) }
                    }
                }
            }
        }
    }
}

fn render_cv(view: &SiteView) -> Markup {
    html! {
        section id="cv" class="cv" {
            h2 { "Experience" }
            div id="cv-timeline" class="timeline" {
                @for exp in &view.timeline {
                    div class="timeline-item" {
                        div class="timeline-marker" {}
                        div class="timeline-content" {
                            span class="timeline-date" { (exp.year) }
                            h4 { (exp.title) }
                            p class="company" { (exp.company) }
                            p { (exp.description) }
                        }
                    }
                }
            }
            @if let Some(url) = &view.cv_download_url {
                a id="cv-download-btn" class="btn" href=(url) target="_blank" { "Download CV" }
            } @else {
                a id="cv-download-btn" class="btn" href="#" { "Download CV" }
            }
        }
    }
}

fn render_contact(view: &SiteView) -> Markup {
    let contact = &view.contact;
    html! {
        section id="contact" class="contact" {
            h2 id="contact-headline" {
                (contact.headline_before)
                @if let Some(word) = &contact.highlight {
                    span class="highlight" { (word) }
                }
                (contact.headline_after)
            }
            p id="contact-subtext" { (contact.subtext) }
            div id="social-links-container" class="social-links" {
                @for link in &view.social_links {
                    @if link.external {
                        a class="social-link" href=(link.href) target="_blank" { (link.label) }
                    } @else {
                        a class="social-link" href=(link.href) { (link.label) }
                    }
                }
            }
        }
    }
}

/// Full public page. `carousel` supplies index and dots for both tracks.
pub fn page(view: &SiteView, carousel: &ViewerSnapshot, auto_advance_ms: u64) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (view.page_title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                nav class="navbar" {
                    a class="logo" href="#home" { (view.page_title) }
                    ul class="nav-links" {
                        li { a href="#about" { "About" } }
                        li { a href="#portfolio" { "Portfolio" } }
                        li { a href="#cv" { "Experience" } }
                        li { a href="#contact" { "Contact" } }
                    }
                }
                (render_hero(view))
                (render_about(view))
                section id="portfolio" class="portfolio" data-viewer data-auto-advance-ms=(auto_advance_ms) {
                    h2 { "Portfolio" }
                    (render_track("Videos", &view.videos, &carousel.video))
                    (render_track("Images", &view.images, &carousel.image))
                }
                (render_cv(view))
                (render_contact(view))
                footer {
                    p id="footer-copyright" { (view.footer_copyright) }
                }
                script { (PreEscaped(JS)) }
            }
        }
    }
}
