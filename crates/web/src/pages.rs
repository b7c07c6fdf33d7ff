//! Server-rendered HTML pages.
//!
//! Every page names its template in `<body data-template="...">`, and all
//! user-supplied text goes through [`escape`].

use std::fmt::Write as _;

use yatube_core::{
    CommentView, GroupPage, ImageService, Page, PostView, ProfilePage,
    forms::{CommentForm, FieldErrors, FieldInfo, FormFields, LoginForm, PostForm, SignupForm},
};
use yatube_db::entities::{group, user};

/// Per-request rendering context.
#[derive(Clone, Copy)]
pub struct Ctx<'a> {
    /// The logged-in user, if any.
    pub viewer: Option<&'a user::Model>,
    /// Resolves image keys to URLs.
    pub images: &'a ImageService,
}

/// Escape HTML special characters.
#[must_use]
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn layout(template: &str, title: &str, viewer: Option<&user::Model>, content: &str) -> String {
    let nav = match viewer {
        Some(user) => format!(
            concat!(
                "<a href=\"/follow/\">Подписки</a> ",
                "<a href=\"/create/\">Новая запись</a> ",
                "<a href=\"/profile/{username}/\">{name}</a> ",
                "<a href=\"/auth/logout/\">Выйти</a>"
            ),
            username = escape(&user.username),
            name = escape(user.display_name()),
        ),
        None => "<a href=\"/auth/login/\">Войти</a> <a href=\"/auth/signup/\">Регистрация</a>"
            .to_string(),
    };

    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"ru\">\n",
            "<head><meta charset=\"utf-8\"><title>{title}</title></head>\n",
            "<body data-template=\"{template}\">\n",
            "<header><nav><a href=\"/\">Yatube</a> {nav}</nav></header>\n",
            "<main>\n{content}</main>\n",
            "</body>\n",
            "</html>\n"
        ),
        title = escape(title),
        template = template,
        nav = nav,
        content = content,
    )
}

fn post_card(view: &PostView, ctx: Ctx<'_>, show_group: bool) -> String {
    let post = &view.post;
    let mut html = String::from("<article class=\"post\">\n<ul>\n");
    let _ = writeln!(
        html,
        "<li>Автор: <a href=\"/profile/{}/\">{}</a></li>",
        escape(&view.author.username),
        escape(view.author.display_name()),
    );
    let _ = writeln!(
        html,
        "<li>Дата публикации: {}</li>",
        post.created_at.format("%d.%m.%Y %H:%M")
    );
    html.push_str("</ul>\n");

    if let Some(key) = &post.image {
        let _ = writeln!(
            html,
            "<img class=\"post-image\" src=\"{}\" alt=\"\">",
            escape(&ctx.images.url(key))
        );
    }

    let _ = writeln!(html, "<p class=\"post-text\">{}</p>", escape(&post.text));
    let _ = writeln!(
        html,
        "<a href=\"/posts/{}/\">подробная информация</a>",
        escape(&post.id)
    );

    if show_group {
        if let Some(group) = &view.group {
            let _ = writeln!(
                html,
                "<a class=\"group-link\" href=\"/group/{}/\">все записи группы {}</a>",
                escape(&group.slug),
                escape(&group.title),
            );
        }
    }

    html.push_str("</article>\n");
    html
}

fn post_list(page: &Page<PostView>, ctx: Ctx<'_>, show_group: bool) -> String {
    let mut html = String::new();
    for view in page.items() {
        html.push_str(&post_card(view, ctx, show_group));
    }
    html.push_str(&paginator(page));
    html
}

fn paginator<T>(page: &Page<T>) -> String {
    if !page.has_other_pages() {
        return String::new();
    }

    let mut html = String::from("<nav class=\"pagination\">\n");
    if let Some(previous) = page.previous_page_number() {
        html.push_str("<a href=\"?page=1\">Первая</a>\n");
        let _ = writeln!(html, "<a href=\"?page={previous}\">Предыдущая</a>");
    }
    for number in page.page_range() {
        if number == page.number() {
            let _ = writeln!(html, "<span class=\"current\">{number}</span>");
        } else {
            let _ = writeln!(html, "<a href=\"?page={number}\">{number}</a>");
        }
    }
    if let Some(next) = page.next_page_number() {
        let _ = writeln!(html, "<a href=\"?page={next}\">Следующая</a>");
        let _ = writeln!(html, "<a href=\"?page={}\">Последняя</a>", page.num_pages());
    }
    html.push_str("</nav>\n");
    html
}

fn field_label(field: &FieldInfo) -> String {
    format!(
        "<label for=\"id_{name}\">{label}</label>\n",
        name = field.name,
        label = escape(field.label),
    )
}

fn field_help(field: &FieldInfo) -> String {
    if field.help_text.is_empty() {
        String::new()
    } else {
        format!(
            "<small class=\"help\">{}</small>\n",
            escape(field.help_text)
        )
    }
}

fn field_error_list(errors: &FieldErrors, name: &str) -> String {
    errors
        .get(name)
        .map(|messages| {
            let items: String = messages
                .iter()
                .map(|m| format!("<li>{}</li>", escape(m)))
                .collect();
            format!("<ul class=\"errorlist\">{items}</ul>\n")
        })
        .unwrap_or_default()
}

fn error_list(messages: &[String]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|m| format!("<li>{}</li>", escape(m)))
        .collect();
    format!("<ul class=\"errorlist nonfield\">{items}</ul>\n")
}

/// `posts/index.html`: the latest posts.
#[must_use]
pub fn index(page: &Page<PostView>, ctx: Ctx<'_>) -> String {
    let content = format!(
        "<h1>Последние обновления на сайте</h1>\n{}",
        post_list(page, ctx, true)
    );
    layout("posts/index.html", "Последние обновления на сайте", ctx.viewer, &content)
}

/// `posts/group_list.html`: a group and its posts.
#[must_use]
pub fn group_list(data: &GroupPage, ctx: Ctx<'_>) -> String {
    let group = &data.group;
    let content = format!(
        "<h1>{title}</h1>\n<p class=\"group-description\">{description}</p>\n{posts}",
        title = escape(&group.title),
        description = escape(&group.description),
        posts = post_list(&data.posts, ctx, false),
    );
    layout(
        "posts/group_list.html",
        &format!("Записи сообщества {}", group.title),
        ctx.viewer,
        &content,
    )
}

/// `posts/profile.html`: an author's page.
#[must_use]
pub fn profile(data: &ProfilePage, ctx: Ctx<'_>) -> String {
    let author = &data.author;
    let username = escape(&author.username);
    let mut content = format!(
        "<h1>Все посты пользователя {name}</h1>\n<h3>Всего постов: {count}</h3>\n",
        name = escape(author.display_name()),
        count = data.posts.count(),
    );

    if ctx.viewer.is_some() && !data.is_self {
        if data.following {
            let _ = writeln!(
                content,
                "<a class=\"unfollow\" href=\"/profile/{username}/unfollow\">Отписаться</a>"
            );
        } else {
            let _ = writeln!(
                content,
                "<a class=\"follow\" href=\"/profile/{username}/follow\">Подписаться</a>"
            );
        }
    }

    content.push_str(&post_list(&data.posts, ctx, true));
    layout(
        "posts/profile.html",
        &format!("Профайл пользователя {}", author.display_name()),
        ctx.viewer,
        &content,
    )
}

/// `posts/post_detail.html`: one post with its comments.
#[must_use]
pub fn post_detail(
    view: &PostView,
    author_post_count: u64,
    comments: &[CommentView],
    ctx: Ctx<'_>,
) -> String {
    let post = &view.post;
    let mut content = String::from("<aside>\n<ul>\n");
    let _ = writeln!(
        content,
        "<li>Дата публикации: {}</li>",
        post.created_at.format("%d.%m.%Y %H:%M")
    );
    if let Some(group) = &view.group {
        let _ = writeln!(
            content,
            "<li>Группа: <a href=\"/group/{}/\">{}</a></li>",
            escape(&group.slug),
            escape(&group.title)
        );
    }
    let _ = writeln!(
        content,
        "<li>Автор: <a href=\"/profile/{}/\">{}</a></li>",
        escape(&view.author.username),
        escape(view.author.display_name())
    );
    let _ = writeln!(
        content,
        "<li>Всего постов автора: <span class=\"author-posts\">{author_post_count}</span></li>"
    );
    content.push_str("</ul>\n</aside>\n");

    if let Some(key) = &post.image {
        let _ = writeln!(
            content,
            "<img class=\"post-image\" src=\"{}\" alt=\"\">",
            escape(&ctx.images.url(key))
        );
    }
    let _ = writeln!(content, "<p class=\"post-text\">{}</p>", escape(&post.text));

    if ctx.viewer.is_some_and(|v| v.id == post.author_id) {
        let _ = writeln!(
            content,
            "<a class=\"edit\" href=\"/posts/{}/edit/\">Редактировать запись</a>",
            escape(&post.id)
        );
    }

    if ctx.viewer.is_some() {
        let field = CommentForm::FIELDS[0];
        let _ = write!(
            content,
            concat!(
                "<form method=\"post\" action=\"/posts/{id}/comment\" class=\"comment-form\">\n",
                "{label}<textarea name=\"text\" id=\"id_text\" required></textarea>\n{help}",
                "<button type=\"submit\">Отправить</button>\n",
                "</form>\n"
            ),
            id = escape(&post.id),
            label = field_label(&field),
            help = field_help(&field),
        );
    }

    content.push_str("<section class=\"comments\">\n");
    for item in comments {
        let _ = writeln!(
            content,
            "<div class=\"comment\"><a href=\"/profile/{}/\">{}</a><p>{}</p></div>",
            escape(&item.author.username),
            escape(item.author.display_name()),
            escape(&item.comment.text),
        );
    }
    content.push_str("</section>\n");

    layout(
        "posts/post_detail.html",
        &format!("Пост {}", post.short_text()),
        ctx.viewer,
        &content,
    )
}

/// Values and errors of a post form being (re)displayed.
#[derive(Debug, Clone, Default)]
pub struct PostFormState {
    pub text: String,
    /// Selected group ID.
    pub group: Option<String>,
    /// Set when editing an existing post.
    pub post_id: Option<String>,
    pub errors: FieldErrors,
}

impl PostFormState {
    /// A form pre-filled from submitted values.
    #[must_use]
    pub fn from_form(form: &PostForm, post_id: Option<String>) -> Self {
        Self {
            text: form.text.clone(),
            group: form.group_id().map(str::to_string),
            post_id,
            ..Self::default()
        }
    }

    /// Whether this form edits an existing post.
    #[must_use]
    pub const fn is_edit(&self) -> bool {
        self.post_id.is_some()
    }
}

/// `posts/create_post.html`: the create/edit form.
#[must_use]
pub fn create_post(state: &PostFormState, groups: &[group::Model], ctx: Ctx<'_>) -> String {
    let (heading, action, button) = match &state.post_id {
        Some(id) => (
            "Редактировать пост",
            format!("/posts/{}/edit/", escape(id)),
            "Сохранить",
        ),
        None => ("Новый пост", "/create/".to_string(), "Добавить"),
    };

    let mut content = format!("<h1>{heading}</h1>\n");
    let _ = writeln!(
        content,
        "<form method=\"post\" action=\"{action}\" enctype=\"multipart/form-data\">"
    );

    for field in PostForm::FIELDS {
        content.push_str("<div class=\"form-group\">\n");
        content.push_str(&field_label(field));
        content.push_str(&field_error_list(&state.errors, field.name));
        match field.name {
            "text" => {
                let _ = writeln!(
                    content,
                    "<textarea name=\"text\" id=\"id_text\" required>{}</textarea>",
                    escape(&state.text)
                );
            }
            "group" => {
                content.push_str("<select name=\"group\" id=\"id_group\">\n<option value=\"\">---------</option>\n");
                for group in groups {
                    let selected = if state.group.as_deref() == Some(group.id.as_str()) {
                        " selected"
                    } else {
                        ""
                    };
                    let _ = writeln!(
                        content,
                        "<option value=\"{}\"{selected}>{}</option>",
                        escape(&group.id),
                        escape(&group.title)
                    );
                }
                content.push_str("</select>\n");
            }
            _ => {
                let _ = writeln!(
                    content,
                    "<input type=\"file\" name=\"{0}\" id=\"id_{0}\" accept=\"image/*\">",
                    field.name
                );
            }
        }
        content.push_str(&field_help(field));
        content.push_str("</div>\n");
    }

    let _ = writeln!(content, "<button type=\"submit\">{button}</button>\n</form>");

    layout("posts/create_post.html", heading, ctx.viewer, &content)
}

/// `posts/follow.html`: posts by followed authors.
#[must_use]
pub fn follow(page: &Page<PostView>, ctx: Ctx<'_>) -> String {
    let content = format!(
        "<h1>Посты авторов, на которых вы подписаны</h1>\n{}",
        post_list(page, ctx, true)
    );
    layout("posts/follow.html", "Подписки", ctx.viewer, &content)
}

fn text_input(field: &FieldInfo, kind: &str, value: &str, errors: &FieldErrors) -> String {
    format!(
        "<div class=\"form-group\">\n{label}{errors}<input type=\"{kind}\" name=\"{name}\" id=\"id_{name}\" value=\"{value}\">\n{help}</div>\n",
        label = field_label(field),
        errors = field_error_list(errors, field.name),
        name = field.name,
        value = escape(value),
        help = field_help(field),
    )
}

/// `users/login.html`.
#[must_use]
pub fn login(form: &LoginForm, errors: &FieldErrors, non_field_errors: &[String]) -> String {
    let mut content = String::from("<h1>Войти на сайт</h1>\n");
    content.push_str(&error_list(non_field_errors));
    content.push_str("<form method=\"post\" action=\"/auth/login/\">\n");
    for field in LoginForm::FIELDS {
        let (kind, value) = if field.name == "password" {
            ("password", "")
        } else {
            ("text", form.username.as_str())
        };
        content.push_str(&text_input(field, kind, value, errors));
    }
    if let Some(next) = &form.next {
        let _ = writeln!(
            content,
            "<input type=\"hidden\" name=\"next\" value=\"{}\">",
            escape(next)
        );
    }
    content.push_str("<button type=\"submit\">Войти</button>\n</form>\n");
    layout("users/login.html", "Войти", None, &content)
}

/// `users/signup.html`.
#[must_use]
pub fn signup(form: &SignupForm, errors: &FieldErrors) -> String {
    let mut content = String::from("<h1>Зарегистрироваться</h1>\n");
    content.push_str("<form method=\"post\" action=\"/auth/signup/\">\n");
    for field in SignupForm::FIELDS {
        let (kind, value) = match field.name {
            "username" => ("text", form.username.as_str()),
            "name" => ("text", form.name.as_deref().unwrap_or_default()),
            _ => ("password", ""),
        };
        content.push_str(&text_input(field, kind, value, errors));
    }
    content.push_str("<button type=\"submit\">Зарегистрироваться</button>\n</form>\n");
    layout("users/signup.html", "Регистрация", None, &content)
}

/// `core/404.html`.
#[must_use]
pub fn not_found() -> String {
    layout(
        "core/404.html",
        "Страница не найдена",
        None,
        "<h1>404</h1>\n<p>Страница не найдена.</p>\n<a href=\"/\">Идите на главную</a>\n",
    )
}

/// `core/403.html`.
#[must_use]
pub fn forbidden() -> String {
    layout(
        "core/403.html",
        "Доступ запрещён",
        None,
        "<h1>403</h1>\n<p>Доступ запрещён.</p>\n",
    )
}

/// `core/400.html`.
#[must_use]
pub fn bad_request(message: &str) -> String {
    layout(
        "core/400.html",
        "Неверный запрос",
        None,
        &format!("<h1>400</h1>\n<p>{}</p>\n", escape(message)),
    )
}

/// `core/500.html`.
#[must_use]
pub fn server_error() -> String {
    layout(
        "core/500.html",
        "Ошибка сервера",
        None,
        "<h1>500</h1>\n<p>Ошибка сервера.</p>\n",
    )
}
