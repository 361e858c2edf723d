use crate::{
    error::AppResult,
    infrastructure::{database::DatabaseInterface, security::hash_password},
    models::{Follow, GroupId, NewComment, NewPost, User},
};
use tracing::info;

/// Password given to every sample user.
pub const SAMPLE_PASSWORD: &str = "yatube-sample";

const SAMPLE_GROUPS: &[(&str, &str, &str)] = &[
    ("cats", "Cats", "Everything about cats"),
    ("books", "Books", "What we are reading"),
    ("travel", "Travel", "Notes from the road"),
];

const SAMPLE_USERS: &[&str] = &["leo", "anna", "fyodor", "marina", "anton"];

const SAMPLE_POSTS: &[(usize, Option<usize>, &str)] = &[
    (0, Some(1), "Finished the first volume, the ballroom chapters drag on."),
    (1, Some(0), "The cat learned to open the fridge. Send help."),
    (2, None, "Spent the whole night writing. Coffee is my co-author."),
    (3, Some(2), "Crimea in September: warm sea, empty beaches."),
    (4, Some(1), "Short stories are harder than novels."),
    (0, None, "Started a new diary today."),
    (1, Some(2), "Train to Petersburg, eight hours of window gazing."),
    (2, Some(1), "Rereading old letters is a dangerous hobby."),
    (3, None, "Poems come in the morning or not at all."),
    (4, Some(0), "Our cat has opinions about every manuscript."),
    (0, Some(2), "Walked to the village and back."),
    (1, None, "Planning a garden for next spring."),
];

// (follower, author) index pairs into SAMPLE_USERS
const SAMPLE_FOLLOWS: &[(usize, usize)] = &[(1, 0), (2, 0), (3, 1), (4, 2), (0, 4)];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub groups: usize,
    pub users: usize,
    pub posts: usize,
    pub follows: usize,
}

/// Fills the store with sample groups, users, posts, comments and follows.
/// Existing groups and users are reused, so seeding twice adds only posts.
pub async fn seed_sample_data(store: &dyn DatabaseInterface) -> AppResult<SeedSummary> {
    let mut summary = SeedSummary::default();

    let mut group_ids: Vec<GroupId> = Vec::with_capacity(SAMPLE_GROUPS.len());
    for (slug, title, description) in SAMPLE_GROUPS {
        let group = match store.get_group_by_slug(slug).await? {
            Some(group) => group,
            None => {
                summary.groups += 1;
                store.create_group(slug, title, description).await?
            }
        };
        group_ids.push(group.id);
    }

    let password_hash = hash_password(SAMPLE_PASSWORD)?;
    let mut users: Vec<User> = Vec::with_capacity(SAMPLE_USERS.len());
    for username in SAMPLE_USERS {
        let user = match store.get_user_by_username(username).await? {
            Some(user) => user,
            None => {
                summary.users += 1;
                store.create_user(username, &password_hash).await?
            }
        };
        users.push(user);
    }

    for (i, (author, group, text)) in SAMPLE_POSTS.iter().enumerate() {
        let post = store
            .create_post(NewPost {
                author_id: users[*author].id,
                text: text.to_string(),
                group_id: group.map(|g| group_ids[g]),
                image: None,
            })
            .await?;
        summary.posts += 1;

        if i % 3 == 0 {
            let commenter = &users[(author + 1) % users.len()];
            store
                .create_comment(NewComment {
                    post_id: post.id,
                    author_id: commenter.id,
                    text: format!("Nice one, {}!", users[*author].username),
                })
                .await?;
        }
    }

    for (follower, author) in SAMPLE_FOLLOWS {
        let created = store
            .create_follow(Follow {
                user_id: users[*follower].id,
                author_id: users[*author].id,
            })
            .await?;
        if created {
            summary.follows += 1;
        }
    }

    info!(
        "Seeded {} groups, {} users, {} posts, {} follows",
        summary.groups, summary.users, summary.posts, summary.follows
    );
    Ok(summary)
}
