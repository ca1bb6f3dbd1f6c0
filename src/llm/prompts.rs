//! Prompt templates, ported verbatim from the source's task-specific
//! strings. `GENERATE_FEED_CONNECTION`, `LABEL_TOPIC`, and
//! `GENERATE_DAILY_QUOTE` are carried but unused, matching the original
//! (SPEC_FULL §B.2/§B.3): no service ever formats and sends them.

pub const SYSTEM_INSIGHT: &str = "You are a book analysis expert. Extract deep insights from book content.\nAlways respond in valid JSON format as specified.";

pub const EXTRACT_KEY_CONCEPTS: &str = "Analyze the following book content and extract key concepts.\n\nBook: {title} by {author}\n\nContent:\n{content}\n\nExtract 5-10 key concepts. For each, provide:\n- title: concise name\n- content: 2-3 sentence explanation\n- supporting_quote: a direct quote from the text (if available)\n- importance: 1-10 rating\n\nRespond in JSON: {{\"concepts\": [{{\"title\": \"\", \"content\": \"\", \"supporting_quote\": \"\", \"importance\": 0}}]}}";

pub const EXTRACT_FRAMEWORKS: &str = "Analyze the following book content and extract mental models and frameworks.\n\nBook: {title} by {author}\n\nContent:\n{content}\n\nExtract any mental models, frameworks, or structured approaches presented. For each:\n- title: name of the framework/model\n- content: detailed explanation of how it works\n- supporting_quote: relevant quote\n- importance: 1-10\n\nRespond in JSON: {{\"frameworks\": [{{\"title\": \"\", \"content\": \"\", \"supporting_quote\": \"\", \"importance\": 0}}]}}";

pub const EXTRACT_TAKEAWAYS: &str = "Analyze the following book content and extract actionable takeaways.\n\nBook: {title} by {author}\n\nContent:\n{content}\n\nExtract 5-10 practical takeaways. For each:\n- title: concise actionable statement\n- content: explanation and how to apply it\n- importance: 1-10\n\nRespond in JSON: {{\"takeaways\": [{{\"title\": \"\", \"content\": \"\", \"importance\": 0}}]}}";

pub const GENERATE_SUMMARY: &str = "Summarize this book content concisely.\n\nBook: {title} by {author}\n\nContent:\n{content}\n\nProvide:\n1. A 2-3 sentence overview\n2. The main argument or thesis\n3. Who this book is for\n\nRespond in JSON: {{\"overview\": \"\", \"thesis\": \"\", \"audience\": \"\"}}";

pub const CHAT_SYSTEM: &str = "You are a knowledgeable book assistant. Answer questions based on the provided book content.\nAlways cite specific passages when possible. If the answer isn't in the provided content, say so.\nBe concise but thorough.";

pub const CHAT_WITH_CONTEXT: &str = "Based on the following book excerpts, answer the user's question.\n\nContext from books:\n{context}\n\nUser question: {question}\n\nProvide a well-structured answer with citations to specific books and pages where relevant.";

pub const GENERATE_FEED_TIL: &str = "Based on this book insight, create a \"Today I Learned\" post for a social feed.\n\nInsight: {insight_title}\nDetails: {insight_content}\nBook: {book_title} by {author}\n\nCreate an engaging, concise TIL post (2-3 sentences) that would make someone want to read this book.\nRespond in JSON: {{\"title\": \"TIL: ...\", \"content\": \"...\"}}";

pub const GENERATE_FEED_CONNECTION: &str = "You found a connection between two books:\n\nBook A: {book_a_title} - Concept: {concept_a}\nBook B: {book_b_title} - Concept: {concept_b}\n\nCreate an engaging \"Connection Discovered\" feed post explaining how these ideas relate.\nRespond in JSON: {{\"title\": \"\", \"content\": \"\"}}";

pub const LABEL_TOPIC: &str = "Given these book titles and keywords that cluster together, suggest a topic name and description.\n\nBooks: {book_titles}\nKeywords: {keywords}\n\nRespond in JSON: {{\"name\": \"\", \"description\": \"\", \"keywords\": []}}";

pub const GENERATE_DAILY_QUOTE: &str = "Select the most thought-provoking quote from this content and explain why it matters.\n\nBook: {title} by {author}\nContent: {content}\n\nRespond in JSON: {{\"quote\": \"\", \"explanation\": \"\", \"page_hint\": \"\"}}";
