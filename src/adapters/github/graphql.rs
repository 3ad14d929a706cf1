//! GraphQL documents for the discussion endpoints.
//!
//! The REST API has no discussions surface, so both discussion listings go
//! through GraphQL with `pageInfo` cursor pagination.

/// All discussions of a repository, 100 per page.
pub const DISCUSSIONS_QUERY: &str = r"
query($owner: String!, $repo: String!, $cursor: String) {
  repository(owner: $owner, name: $repo) {
    discussions(first: 100, after: $cursor) {
      pageInfo {
        hasNextPage
        endCursor
      }
      nodes {
        id
        number
        title
        body
        bodyText
        createdAt
        updatedAt
        closedAt
        locked
        url
        author {
          login
          ... on User {
            id
          }
        }
        category {
          id
          name
          description
          emoji
        }
        labels(first: 10) {
          nodes {
            id
            name
            color
          }
        }
        upvoteCount
        answerChosenAt
        answer {
          id
        }
      }
    }
  }
}
";

/// Comments of one discussion, 100 per page, with the first replies inline.
pub const DISCUSSION_COMMENTS_QUERY: &str = r"
query($owner: String!, $repo: String!, $number: Int!, $cursor: String) {
  repository(owner: $owner, name: $repo) {
    discussion(number: $number) {
      comments(first: 100, after: $cursor) {
        pageInfo {
          hasNextPage
          endCursor
        }
        nodes {
          id
          body
          bodyText
          createdAt
          updatedAt
          author {
            login
            ... on User {
              id
            }
          }
          upvoteCount
          isAnswer
          url
          replies(first: 10) {
            nodes {
              id
              body
              createdAt
              author {
                login
              }
            }
          }
        }
      }
    }
  }
}
";
